//! Telegram adapter: decodes updates into typed engine events at the boundary,
//! renders typed replies and notices back to chat messages.

pub mod decode;
pub mod handlers;
pub mod notifier;
pub mod render;
pub mod router;

pub use notifier::TelegramNotifier;

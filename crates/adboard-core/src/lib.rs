//! Core engine for the classifieds bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the moderation
//! provider live behind ports (traits) implemented in adapter crates; the
//! dialogue state machine, complaint workflow and notification fanout are all
//! driven through [`engine::Engine::handle_event`].

pub mod complaints;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod moderation;
pub mod notify;
pub mod session;
pub mod store;

pub use errors::{Error, Result};

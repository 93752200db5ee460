//! Telegram update handlers.
//!
//! Each handler decodes the update into a typed engine event, runs it through
//! the engine, and renders the replies back to the chat. Per-user ordering is
//! enforced inside the engine, so handlers stay thin.

use std::sync::Arc;

use teloxide::prelude::*;

use adboard_core::domain::Actor;
use adboard_core::events::Event;

use crate::notifier::send_out;
use crate::render::render_replies;
use crate::router::AppState;

mod callback;
mod message;

pub use callback::handle_callback;
pub use message::handle_message;

fn actor_from(user: &teloxide::types::User) -> Actor {
    Actor {
        id: adboard_core::domain::UserId(user.id.0 as i64),
        handle: user
            .username
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

async fn run_event(bot: &Bot, state: &Arc<AppState>, chat_id: ChatId, actor: &Actor, event: Event) {
    let replies = state.engine.handle_event(actor, event).await;
    for out in render_replies(actor.id, &replies) {
        if let Err(err) = send_out(bot, chat_id, out).await {
            tracing::warn!(error = %err, chat = chat_id.0, "failed to send reply");
        }
    }
}

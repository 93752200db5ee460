use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::decode::{decode, Decoded};
use crate::render::report_reason_keyboard;
use crate::router::AppState;

use super::{actor_from, run_event};

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let actor = actor_from(&q.from);
    let chat_id = q.message.as_ref().map(|m| m.chat.id);
    let data = q.data.clone().unwrap_or_default();

    // Always answer the callback query eventually.
    let Some(chat_id) = chat_id else {
        let _ = bot.answer_callback_query(cb_id).await;
        return Ok(());
    };

    let decoded = decode(&data);
    let _ = bot.answer_callback_query(cb_id).await;

    match decoded {
        Some(Decoded::Engine(event)) => {
            run_event(&bot, &state, chat_id, &actor, event).await;
        }
        Some(Decoded::ReportMenu(listing_id)) => {
            let _ = bot
                .send_message(chat_id, "Why are you reporting this listing?")
                .parse_mode(ParseMode::Html)
                .reply_markup(report_reason_keyboard(listing_id))
                .await;
        }
        None => {
            tracing::warn!(payload = %data, "unrecognized callback payload");
        }
    }

    Ok(())
}

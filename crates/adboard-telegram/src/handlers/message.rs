use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use adboard_core::domain::PhotoRef;
use adboard_core::events::{BrowseScope, Event, Selection};

use crate::render::subscription_keyboard;
use crate::router::AppState;

use super::{actor_from, run_event};

fn parse_command(text: &str) -> Option<(String, String)> {
    if !text.trim_start().starts_with('/') {
        return None;
    }
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some((cmd, rest))
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let actor = actor_from(user);
    let chat_id = msg.chat.id;

    // Photo message: take the highest-resolution variant.
    if let Some(sizes) = msg.photo() {
        if let Some(best) = sizes.last() {
            let event = Event::Media(PhotoRef(best.file.id.clone()));
            run_event(&bot, &state, chat_id, &actor, event).await;
        }
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    let event = match parse_command(text) {
        None => Event::Text(text.to_string()),
        Some((cmd, args)) => match cmd.as_str() {
            "start" => Event::Selection(Selection::Start),
            "add" => Event::Selection(Selection::StartListing),
            "list" => Event::Selection(Selection::Browse(BrowseScope::All)),
            "my" => Event::Selection(Selection::Browse(BrowseScope::Mine)),
            "fav" => Event::Selection(Selection::Browse(BrowseScope::Favorites)),
            "skip" => Event::Selection(Selection::SkipPhoto),
            "cancel" => Event::Cancel,
            "search" => {
                if args.is_empty() {
                    let _ = bot
                        .send_message(chat_id, "Usage: /search <keyword>")
                        .await;
                    return Ok(());
                }
                Event::Selection(Selection::Browse(BrowseScope::Search(args)))
            }
            "subs" => {
                let _ = bot
                    .send_message(chat_id, "Tap a category to subscribe or unsubscribe:")
                    .parse_mode(ParseMode::Html)
                    .reply_markup(subscription_keyboard())
                    .await;
                return Ok(());
            }
            _ => {
                let _ = bot
                    .send_message(chat_id, "Unknown command. Try /start for the list.")
                    .await;
                return Ok(());
            }
        },
    };

    run_event(&bot, &state, chat_id, &actor, event).await;
    Ok(())
}

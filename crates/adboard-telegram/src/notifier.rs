use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use adboard_core::{
    domain::UserId,
    events::Notice,
    notify::NotificationPort,
    errors::Error,
    Result,
};

use crate::render::{render_notice, OutMessage};

/// Delivers typed notices as Telegram messages (private chat id == user id).
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

pub(crate) async fn send_out(bot: &Bot, chat_id: ChatId, out: OutMessage) -> Result<()> {
    let map_err = |e: teloxide::RequestError| Error::External(format!("telegram send: {e}"));

    if let Some(file_id) = out.photo {
        let mut req = bot
            .send_photo(chat_id, InputFile::file_id(file_id))
            .caption(out.text)
            .parse_mode(ParseMode::Html);
        if let Some(kb) = out.keyboard {
            req = req.reply_markup(kb);
        }
        req.await.map_err(map_err)?;
        return Ok(());
    }

    let mut req = bot
        .send_message(chat_id, out.text)
        .parse_mode(ParseMode::Html);
    if let Some(kb) = out.keyboard {
        req = req.reply_markup(kb);
    }
    req.await.map_err(map_err)?;
    Ok(())
}

#[async_trait]
impl NotificationPort for TelegramNotifier {
    async fn notify(&self, user: UserId, notice: Notice) -> Result<()> {
        send_out(&self.bot, ChatId(user.0), render_notice(&notice)).await
    }
}

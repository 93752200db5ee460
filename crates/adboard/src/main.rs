use std::sync::Arc;

use teloxide::Bot;

use adboard_core::{
    config::Config, engine::Engine, moderation::ModerationGate, store::MemoryStore,
};
use adboard_moderation::OpenAiModerationClient;
use adboard_telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> Result<(), adboard_core::Error> {
    adboard_core::logging::init("adboard")?;

    let cfg = Arc::new(Config::load()?);

    let bot = Bot::new(cfg.bot_token.clone());
    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));

    let moderation = Arc::new(OpenAiModerationClient::new(
        cfg.moderation_api_key.clone(),
        cfg.moderation_model.clone(),
    )?);
    let gate = ModerationGate::new(moderation, cfg.moderation_timeout);

    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(cfg.admin, store, gate, notifier));

    adboard_telegram::router::run_polling(bot, cfg, engine)
        .await
        .map_err(|e| adboard_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

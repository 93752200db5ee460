use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use adboard_core::{config::Config, engine::Engine};

use crate::handlers;

pub struct AppState {
    pub cfg: Arc<Config>,
    pub engine: Arc<Engine>,
}

/// Long-polling loop. The caller owns the `Bot` so the same instance backs
/// both the handlers and the notification port.
pub async fn run_polling(bot: Bot, cfg: Arc<Config>, engine: Arc<Engine>) -> anyhow::Result<()> {
    if let Ok(me) = bot.get_me().await {
        tracing::info!(bot = me.username(), "adboard started");
    }
    tracing::info!(admin = cfg.admin.0, "administrator configured");

    let state = Arc::new(AppState { cfg, engine });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use tcb_core::{config::Config, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

/// Everything a handler needs, created once per process and passed through the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub messenger: Arc<dyn MessagingPort>,
    /// Bot username without `@`, used for mentions and the invite link.
    pub bot_username: String,
    pub version: &'static str,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>, bot_username: &str) -> Self {
        Self {
            cfg,
            messenger,
            bot_username: bot_username.trim_start_matches('@').to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "как пользоваться ботом"),
        BotCommand::new("help", "поддерживаемые форматы"),
        BotCommand::new("about", "о боте"),
    ]
}

/// Long-poll Telegram until Ctrl-C.
pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let me = bot.get_me().await?;
    tracing::info!(username = %me.username(), "time calculator bot started");

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        tracing::warn!(error = %e, "failed to register bot commands");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(cfg, messenger, me.username()));

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("polling stopped");
    Ok(())
}

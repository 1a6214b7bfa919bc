use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::info;

use lgr_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use lgr_core::{
    catalog::port::CatalogPort,
    commands::CommandService,
    config::Config,
    domain::UserId,
    messaging::port::MessagingPort,
    reading::{ReactionController, ReaderContext, SessionRegistry},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub messenger: Arc<dyn MessagingPort>,
    pub commands: Arc<CommandService>,
    pub controller: Arc<ReactionController>,
}

impl AppState {
    /// Wire the reading engine and the command service onto `messenger`.
    pub fn new(
        cfg: &Config,
        messenger: Arc<dyn MessagingPort>,
        catalog: Arc<dyn CatalogPort>,
        bot_user: UserId,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let reader = ReaderContext::new(cfg, messenger.clone(), registry);
        let commands = Arc::new(CommandService::new(
            catalog,
            reader.clone(),
            cfg.command_cleanup_delay,
        ));
        let controller = Arc::new(ReactionController::new(reader, bot_user));
        Self {
            messenger,
            commands,
            controller,
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>, catalog: Arc<dyn CatalogPort>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Presses by the bot itself must be recognisable.
    let me = bot.get_me().await?;
    info!(username = %me.username(), "lgr started");
    info!(
        catalog = %cfg.catalog_base_url,
        inactivity_secs = cfg.inactivity_timeout.as_secs(),
        "reader configured"
    );

    // Page flips are edits to the same message; the decorator spaces them out
    // to stay under Telegram's per-chat limits. The adapter still retries once
    // on RetryAfter.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let state = Arc::new(AppState::new(
        &cfg,
        messenger,
        catalog,
        UserId(me.id.0 as i64),
    ));

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

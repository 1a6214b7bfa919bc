//! Telegram update handlers.
//!
//! Each handler is a small adapter that turns a teloxide update into a
//! platform-neutral core event and hands it to the matching service.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

/// Only commands are acted on; other chatter in the chat is ignored.
pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.text().map(|t| t.starts_with('/')).unwrap_or(false) {
        return commands::handle_command(msg, state).await;
    }
    Ok(())
}

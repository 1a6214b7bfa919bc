use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, warn};

use lgr_core::{
    commands::parse_command,
    domain::{ChatId, MessageId, MessageRef, Reader, UserId},
    messaging::types::Command,
};

use crate::router::AppState;

const FAILURE_REPLY: &str = "Little Garden ne répond pas pour le moment 😢";

/// How a user is named on reading cards: `@username`, or the first name.
fn display_name(username: Option<&str>, first_name: &str) -> String {
    match username.filter(|u| !u.is_empty()) {
        Some(u) => format!("@{u}"),
        None => first_name.to_string(),
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let (Some(text), Some(user)) = (msg.text(), msg.from()) else {
        return Ok(());
    };

    let (name, args) = parse_command(text);
    let chat_id = ChatId(msg.chat.id.0);
    let cmd = Command {
        chat_id,
        from: Reader {
            id: UserId(user.id.0 as i64),
            name: display_name(user.username.as_deref(), &user.first_name),
        },
        message: MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        },
        name,
        args,
    };

    match state.commands.handle(&cmd).await {
        Ok(true) => {}
        Ok(false) => debug!(command = %cmd.name, "unknown command ignored"),
        Err(e) => {
            warn!(command = %cmd.name, chat_id = chat_id.0, "command failed: {e}");
            let _ = state.messenger.send_html(chat_id, FAILURE_REPLY).await;
        }
    }

    Ok(())
}

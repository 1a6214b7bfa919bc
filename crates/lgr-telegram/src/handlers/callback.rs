use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, warn};

use lgr_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::ReactionEvent,
};

use crate::router::AppState;

/// A press on a reading card button is the reaction of its glyph.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    // Stop the client spinner first; the session may take a moment.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let (Some(message), Some(data)) = (q.message.as_ref(), q.data.clone()) else {
        return Ok(());
    };

    let chat_id = ChatId(message.chat.id.0);
    let ev = ReactionEvent {
        message: MessageRef {
            chat_id,
            message_id: MessageId(message.id.0),
        },
        emoji: data,
        actor: UserId(q.from.id.0 as i64),
    };

    match state.controller.handle(&ev).await {
        Ok(outcome) => debug!(actor = %ev.actor, ?outcome, "reaction handled"),
        Err(e) => warn!(actor = %ev.actor, chat_id = chat_id.0, "reaction failed: {e}"),
    }

    Ok(())
}

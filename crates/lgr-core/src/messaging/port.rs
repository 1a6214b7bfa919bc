use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, UserId},
    messaging::types::RichMessage,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation. Edits and deletes of a message that no
/// longer exists must fail with `Error::NotFound` so callers can treat them as
/// already done.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;
    async fn send_rich(&self, chat_id: ChatId, msg: &RichMessage) -> Result<MessageRef>;
    async fn edit_rich(&self, msg: MessageRef, rich: &RichMessage) -> Result<()>;
    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    /// Attach a reaction affordance. Adding one that is already there is a no-op.
    async fn add_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()>;
    /// Drop a reaction affordance entirely (all holders).
    async fn remove_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()>;
    /// Retract the mark `user` left with `emoji`, keeping the affordance itself.
    async fn remove_user_reaction(&self, msg: MessageRef, emoji: &str, user: UserId)
        -> Result<()>;

    /// Private notice to a user.
    async fn send_direct(&self, user: UserId, html: &str) -> Result<()>;
}

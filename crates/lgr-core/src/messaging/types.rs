use crate::domain::{ChatId, MessageRef, Reader, UserId};

/// A bot command (`/name args`), platform-neutral.
///
/// Platform-specific fields should live in the adapter crate.
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub from: Reader,
    /// The command message itself (deleted after a successful `/lire`).
    pub message: MessageRef,
    pub name: String,
    pub args: String,
}

/// A user added `emoji` on `message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message: MessageRef,
    pub emoji: String,
    pub actor: UserId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RichField {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RichFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// Card-style message: title + link, fields, a large image and a thumbnail.
///
/// Messengers without native cards render it as an image with an HTML caption.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichMessage {
    pub title: String,
    pub url: Option<String>,
    pub fields: Vec<RichField>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub footer: Option<RichFooter>,
}

impl RichMessage {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

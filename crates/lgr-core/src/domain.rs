use std::fmt;

/// Chat-platform user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Chat id (numeric). Private chats share the id of their user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Message id (numeric, unique per chat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The person owning a reading session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reader {
    pub id: UserId,
    /// Display tag shown in the "Lecteur" field (e.g. `@username`).
    pub name: String,
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for ChatId {
    fn from(u: UserId) -> Self {
        ChatId(u.0)
    }
}

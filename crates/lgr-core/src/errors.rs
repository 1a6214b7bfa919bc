/// Core error type for the reader bot.
///
/// Adapter crates map their specific errors into this type so the reading
/// engine can tell "the message is already gone" apart from real failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog error: {0}")]
    Catalog(String),

    /// The remote resource (usually a chat message) no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

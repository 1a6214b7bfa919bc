//! Cross-messenger abstractions (Telegram today; Discord later).

pub mod port;
pub mod throttled;
pub mod types;

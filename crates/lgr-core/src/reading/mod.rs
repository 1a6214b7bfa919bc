//! Reading sessions: one live chapter per user, rendered into a single chat
//! message and driven by reactions on it.

use std::{sync::Arc, time::Duration};

use crate::{catalog::links::CatalogLinks, config::Config, messaging::port::MessagingPort};

pub mod controller;
pub mod registry;
pub mod render;
pub mod session;

pub use controller::{IgnoreReason, NavCommand, ReactionController, ReactionOutcome};
pub use registry::SessionRegistry;
pub use session::{PageArg, ReadingSession, SessionSnapshot, StartReading};

/// Reaction glyphs used as navigation affordances.
pub mod glyph {
    pub const PREV: &str = "\u{1F448}"; // 👈
    pub const NEXT: &str = "\u{1F449}"; // 👉
    pub const STOP: &str = "\u{274C}"; // ❌
    /// Shown while private; pressing it shares the session.
    pub const SHARE: &str = "\u{1F468}\u{200D}\u{1F468}\u{200D}\u{1F466}"; // 👨‍👨‍👦
    /// Shown while shared; pressing it makes the session private again.
    pub const UNSHARE: &str = "\u{1F64D}\u{200D}\u{2642}\u{FE0F}"; // 🙍‍♂️

    pub const NAVIGATION: [&str; 3] = [PREV, NEXT, STOP];
}

/// Collaborators every session needs.
pub struct ReaderContext {
    pub messenger: Arc<dyn MessagingPort>,
    pub registry: Arc<SessionRegistry>,
    pub links: CatalogLinks,
    pub inactivity_timeout: Duration,
}

impl ReaderContext {
    pub fn new(
        cfg: &Config,
        messenger: Arc<dyn MessagingPort>,
        registry: Arc<SessionRegistry>,
    ) -> Arc<Self> {
        Arc::new(Self {
            messenger,
            registry,
            links: CatalogLinks::new(cfg.catalog_base_url.clone()),
            inactivity_timeout: cfg.inactivity_timeout,
        })
    }
}

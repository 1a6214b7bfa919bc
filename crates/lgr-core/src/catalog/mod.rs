//! Manga catalog: value types, the read-only port, and site links.

pub mod links;
pub mod port;
pub mod types;

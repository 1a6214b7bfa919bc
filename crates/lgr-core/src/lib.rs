//! Core domain + application logic for the Little Garden reading bot.
//!
//! This crate is framework-agnostic. Telegram and the Little Garden catalog
//! live behind ports (traits) implemented in adapter crates.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod reading;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};

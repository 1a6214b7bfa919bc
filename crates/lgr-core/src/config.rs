use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_CATALOG_URL: &str = "https://littlexgarden.com";

/// Typed configuration for the reader bot.
///
/// Only the bot token is required; everything else has the defaults the
/// service has always used.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,

    // Catalog
    pub catalog_base_url: String,
    pub catalog_page_size: u32,
    pub catalog_timeout: Duration,

    // Reading sessions
    pub inactivity_timeout: Duration,
    pub command_cleanup_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let catalog_base_url = env_str("CATALOG_BASE_URL")
            .and_then(non_empty)
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        let catalog_page_size = env_u32("CATALOG_PAGE_SIZE").unwrap_or(5).max(1);
        let catalog_timeout = Duration::from_secs(env_u64("CATALOG_TIMEOUT_SECS").unwrap_or(10));

        let inactivity_timeout =
            Duration::from_secs(env_u64("READING_INACTIVITY_SECS").unwrap_or(5 * 60));
        let command_cleanup_delay =
            Duration::from_millis(env_u64("COMMAND_CLEANUP_DELAY_MS").unwrap_or(10_000));

        Ok(Self {
            telegram_bot_token,
            catalog_base_url,
            catalog_page_size,
            catalog_timeout,
            inactivity_timeout,
            command_cleanup_delay,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

//! Environment-driven bot configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::commands::publisher::RetryPolicy;

/// Runtime configuration, read from the environment (and `.env` via dotenvy)
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub log_level: String,
    /// JSON file holding the persisted guild records
    pub guild_database_path: String,
    /// Directory scanned for `<plugin>/manifest.json`
    pub plugins_dir: String,
    pub command_api_timeout_secs: u64,
    pub command_api_max_attempts: u32,
    pub command_api_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("DISCORD_TOKEN must be set")?;

        Ok(Self {
            discord_token,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            guild_database_path: lookup("GUILD_DATABASE_PATH")
                .unwrap_or_else(|| "./configs/database.json".to_string()),
            plugins_dir: lookup("PLUGINS_DIR").unwrap_or_else(|| "./plugins".to_string()),
            command_api_timeout_secs: parse_or(&lookup, "COMMAND_API_TIMEOUT_SECS", 10)?,
            command_api_max_attempts: parse_or(&lookup, "COMMAND_API_MAX_ATTEMPTS", 3)?,
            command_api_backoff_ms: parse_or(&lookup, "COMMAND_API_BACKOFF_MS", 500)?,
        })
    }

    /// Timeout/retry settings for remote command API calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.command_api_timeout_secs),
            max_attempts: self.command_api_max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.command_api_backoff_ms),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

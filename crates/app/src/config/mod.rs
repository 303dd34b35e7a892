use std::path::PathBuf;
use std::time::Duration;

use ingest::WatchOptions;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const CREDENTIALS_FILE_NAME: &str = ".credentials.json";

/// Paths, limits and tuning knobs for one tracker instance.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the agent's data directory; logs live under `projects/`.
    pub claude_data_path: PathBuf,
    pub db_path: PathBuf,
    pub five_hour_limit_tokens: Option<u64>,
    pub weekly_opus_hours: u64,
    pub weekly_sonnet_hours: u64,
    pub opus_tokens_per_hour: u64,
    pub sonnet_tokens_per_hour: u64,
    pub quota_cache_secs: u64,
    pub quota_timeout_secs: u64,
    pub watch_workers: usize,
    pub watch_queue_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            claude_data_path: ingest::default_claude_data_path(),
            db_path: PathBuf::from("data").join("usage.db"),
            five_hour_limit_tokens: None,
            weekly_opus_hours: 35,
            weekly_sonnet_hours: 280,
            opus_tokens_per_hour: 50_000,
            sonnet_tokens_per_hour: 100_000,
            quota_cache_secs: 60,
            quota_timeout_secs: 10,
            watch_workers: 4,
            watch_queue_capacity: 256,
        }
    }
}

impl AppConfig {
    pub fn projects_dir(&self) -> PathBuf {
        ingest::projects_dir(&self.claude_data_path)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.claude_data_path.join(CREDENTIALS_FILE_NAME)
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            workers: self.watch_workers,
            queue_capacity: self.watch_queue_capacity,
        }
    }

    pub fn quota_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quota_cache_secs)
    }

    pub fn quota_timeout(&self) -> Duration {
        Duration::from_secs(self.quota_timeout_secs.max(1))
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Empty values are ignored; values that
    /// do not parse are rejected.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("CLAUDE_DATA_PATH") {
            self.claude_data_path = PathBuf::from(value);
        }
        if let Some(value) = get("DB_PATH") {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = get("FIVE_HOUR_LIMIT_TOKENS") {
            self.five_hour_limit_tokens = Some(parse_number("FIVE_HOUR_LIMIT_TOKENS", &value)?);
        }
        if let Some(value) = get("WEEKLY_OPUS_HOURS") {
            self.weekly_opus_hours = parse_number("WEEKLY_OPUS_HOURS", &value)?;
        }
        if let Some(value) = get("WEEKLY_SONNET_HOURS") {
            self.weekly_sonnet_hours = parse_number("WEEKLY_SONNET_HOURS", &value)?;
        }
        if let Some(value) = get("OPUS_TOKENS_PER_HOUR") {
            self.opus_tokens_per_hour = parse_number("OPUS_TOKENS_PER_HOUR", &value)?;
        }
        if let Some(value) = get("SONNET_TOKENS_PER_HOUR") {
            self.sonnet_tokens_per_hour = parse_number("SONNET_TOKENS_PER_HOUR", &value)?;
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| AppError::InvalidInput(format!("invalid value for {key}: {value}")))
}

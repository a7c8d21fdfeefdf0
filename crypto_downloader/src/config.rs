//! Downloader configuration: TOML file, defaults and environment overrides.
//!
//! ```toml
//! data_dir = "crypto_data"
//! max_concurrency = 1
//!
//! [provider]
//! base_url = "https://api.binance.com"
//! page_limit = 1000
//! history_days = 30
//! ```
//!
//! Every field is optional; an empty file yields [`DownloaderConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_utils::env::env_path_opt;
use thiserror::Error;
use tracing::debug;

/// Overrides [`DownloaderConfig::data_dir`] when set.
pub const DATA_DIR_ENV: &str = "CRYPTO_DATA_DIR";

pub const DEFAULT_DATA_DIR: &str = "crypto_data";
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
/// Largest page the klines endpoint serves.
pub const MAX_PAGE_LIMIT: u16 = 1000;
/// Upper bound on `provider.history_days` (about a century).
pub const MAX_HISTORY_DAYS: u32 = 36_500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloaderConfig {
    /// Root directory of the local store.
    pub data_dir: PathBuf,
    /// How many keys `download_multiple` fetches at once.
    pub max_concurrency: usize,
    pub provider: ProviderConfig,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_concurrency: 1,
            provider: ProviderConfig::default(),
        }
    }
}

/// Settings of the Binance klines client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Candles requested per page, 1..=1000.
    pub page_limit: u16,
    /// Upper bound on pages per fetch.
    pub max_pages: u32,
    /// Look-back used when `start` is not set.
    pub history_days: u32,
    /// Fixed first candle time; takes precedence over `history_days`.
    pub start: Option<DateTime<Utc>>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: MAX_PAGE_LIMIT,
            max_pages: 1000,
            history_days: 30,
            start: None,
            timeout_secs: 30,
        }
    }
}

impl DownloaderConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), data_dir = %config.data_dir.display(), "loaded config");
        Ok(config)
    }

    /// Replaces settings with their environment overrides, if any.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(dir) = env_path_opt(DATA_DIR_ENV) {
            debug!(data_dir = %dir.display(), "data_dir overridden from {DATA_DIR_ENV}");
            self.data_dir = dir;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid("max_concurrency must be > 0".into()));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.provider.page_limit) {
            return Err(ConfigError::Invalid(format!(
                "provider.page_limit must be within 1..={MAX_PAGE_LIMIT}, got {}",
                self.provider.page_limit
            )));
        }
        if self.provider.max_pages == 0 {
            return Err(ConfigError::Invalid("provider.max_pages must be > 0".into()));
        }
        if self.provider.history_days > MAX_HISTORY_DAYS {
            return Err(ConfigError::Invalid(format!(
                "provider.history_days must be at most {MAX_HISTORY_DAYS}, got {}",
                self.provider.history_days
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url cannot be empty".into()));
        }
        Ok(())
    }
}

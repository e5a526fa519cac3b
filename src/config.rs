//! Configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. Durations are written as
//! duration strings (`"30s"`, `"15m"`); malformed values are rejected at
//! parse time, before any component is constructed.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub warm: WarmCacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the TTL-backed cache-aside quote cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Default entry lifetime. Unset means entries never expire.
    #[serde(default, with = "humantime_serde")]
    pub expiry_time: Option<Duration>,

    /// Period of the background sweep that evicts expired entries.
    /// Unset falls back to a 60s sweep.
    #[serde(default, with = "humantime_serde")]
    pub cleanup_interval: Option<Duration>,

    /// Upper bound on how long a caller waits for another caller's
    /// in-flight fetch of the same symbol.
    #[serde(default = "default_fetch_wait_timeout", with = "humantime_serde")]
    pub fetch_wait_timeout: Duration,
}

/// Settings for the warm full-keyspace quote cache.
#[derive(Debug, Clone, Deserialize)]
pub struct WarmCacheConfig {
    /// How often the whole keyspace is reloaded from the document store.
    #[serde(default = "default_reload_interval", with = "humantime_serde")]
    pub reload_interval: Duration,

    /// Page size for full scans of the document store.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Upper bound on how long a caller waits for another caller's
    /// in-flight fetch of the same symbol.
    #[serde(default = "default_fetch_wait_timeout", with = "humantime_serde")]
    pub fetch_wait_timeout: Duration,
}

/// Settings for batch-ingestion jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Attempts per store write before giving up.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between write attempts.
    #[serde(default = "default_backoff", with = "humantime_serde")]
    pub backoff: Duration,

    /// Self-imposed provider call budget per rolling minute.
    #[serde(default = "default_calls_per_minute")]
    pub calls_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_fetch_wait_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_reload_interval() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_page_size() -> u64 {
    1000
}

fn default_retries() -> u32 {
    10
}

fn default_backoff() -> Duration {
    Duration::from_millis(300)
}

fn default_calls_per_minute() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry_time: None,
            cleanup_interval: None,
            fetch_wait_timeout: default_fetch_wait_timeout(),
        }
    }
}

impl Default for WarmCacheConfig {
    fn default() -> Self {
        Self {
            reload_interval: default_reload_interval(),
            page_size: default_page_size(),
            fetch_wait_timeout: default_fetch_wait_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            backoff: default_backoff(),
            calls_per_minute: default_calls_per_minute(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.warm.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "warm.page_size",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.sync.retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.retries",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.sync.calls_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.calls_per_minute",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.warm.reload_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "warm.reload_interval",
                reason: "must be non-zero".into(),
            }
            .into());
        }
        // A zero sweep period would panic inside the sweeper task.
        if self.cache.cleanup_interval.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::InvalidValue {
                field: "cache.cleanup_interval",
                reason: "must be non-zero".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

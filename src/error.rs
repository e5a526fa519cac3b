use thiserror::Error;

use crate::domain::Symbol;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bounded wait for another caller's in-flight fetch expired.
    #[error("timed out waiting for in-flight fetch of '{symbol}'")]
    FetchWaitTimeout { symbol: Symbol },

    /// Upstream market-data provider failure, propagated verbatim.
    #[error("quote provider error: {0}")]
    Provider(String),

    /// Document store scan or upsert failure.
    #[error("store error: {0}")]
    Store(String),

    /// A stored document did not decode to the expected quote shape.
    /// Always a hard error: it indicates a programming or serialization
    /// defect, never something to paper over.
    #[error("malformed stored quote: {0}")]
    InvalidStoredQuote(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

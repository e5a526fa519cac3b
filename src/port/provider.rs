//! Upstream market-data provider port.

use async_trait::async_trait;

use crate::domain::{Quote, Symbol};
use crate::error::Result;

/// Fetches live quotes from an upstream market-data API.
///
/// The upstream is assumed slow, rate-limited, and occasionally erroring;
/// callers deduplicate concurrent fetches and never retry here.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) as fetches are
/// issued concurrently from many request tasks.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the current quote for a symbol.
    ///
    /// Errors are propagated verbatim to the caller; this layer performs
    /// no retries.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote>;
}

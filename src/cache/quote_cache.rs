//! Cache-aside quote cache with single-flight fetch deduplication.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use tracing::debug;

use crate::cache::{KeyedLock, TtlCache};
use crate::config::CacheConfig;
use crate::domain::{Quote, Symbol};
use crate::error::{Error, Result};
use crate::port::QuoteProvider;

/// TTL-backed quote cache that populates itself from the upstream provider.
///
/// Reads check the cache first; a miss races for the symbol's lock and the
/// winner performs the one upstream call while the losers await its result.
/// Many simultaneous misses on one symbol therefore produce exactly one
/// provider call.
pub struct QuoteCache<P> {
    entries: TtlCache<Symbol, Quote>,
    locks: KeyedLock<Symbol>,
    provider: Arc<P>,
    fetch_wait_timeout: Duration,
}

impl<P: QuoteProvider> QuoteCache<P> {
    /// Create a cache over the given provider.
    ///
    /// Must be called inside a Tokio runtime; the TTL sweep task is
    /// spawned here.
    #[must_use]
    pub fn new(provider: Arc<P>, config: &CacheConfig) -> Self {
        Self {
            entries: TtlCache::new(config),
            locks: KeyedLock::new(),
            provider,
            fetch_wait_timeout: config.fetch_wait_timeout,
        }
    }

    /// Get the quote for `symbol`, fetching upstream on a miss.
    ///
    /// On a hit no lock is taken and no upstream call occurs. On a miss
    /// exactly one concurrent caller fetches; the rest wait for its result
    /// up to `fetch_wait_timeout` and fail with
    /// [`Error::FetchWaitTimeout`] past that. An upstream failure is
    /// propagated verbatim and nothing is cached for it.
    pub async fn get(&self, symbol: &Symbol) -> Result<Quote> {
        let deadline = Instant::now() + self.fetch_wait_timeout;

        loop {
            if let Some(quote) = self.entries.get(symbol) {
                return Ok(quote);
            }

            if self.locks.try_lock(symbol) {
                let result = self.fetch_and_store(symbol).await;
                self.locks.unlock(symbol);
                return result;
            }

            // Another caller is fetching this symbol; await its result.
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero()
                || tokio::time::timeout(remaining, self.locks.wait(symbol))
                    .await
                    .is_err()
            {
                return Err(Error::FetchWaitTimeout {
                    symbol: symbol.clone(),
                });
            }
        }
    }

    /// Store a quote directly, bypassing the provider.
    pub fn insert(&self, quote: Quote) {
        self.entries.insert(quote.symbol.clone(), quote);
    }

    /// Store a quote with an explicit TTL.
    pub fn insert_with_ttl(&self, quote: Quote, ttl: Duration) {
        self.entries.insert_with_ttl(quote.symbol.clone(), quote, ttl);
    }

    async fn fetch_and_store(&self, symbol: &Symbol) -> Result<Quote> {
        let quote = self.provider.fetch_quote(symbol).await?;
        debug!(symbol = %symbol, "fetched quote upstream");
        // Insert before the caller unlocks so woken waiters observe it.
        self.entries.insert(symbol.clone(), quote.clone());
        Ok(quote)
    }
}

//! Batch quote ingestion: fetch a symbol list and persist it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::domain::Symbol;
use crate::error::Result;
use crate::ingest::with_retry;
use crate::port::{QuoteProvider, QuoteStore};

/// Outcome of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Symbols fetched and persisted.
    pub synced: usize,
    /// Symbols skipped after a fetch or persist failure.
    pub failed: usize,
}

/// Fetches quotes for a symbol list and upserts them into the store.
///
/// The job self-throttles to `calls_per_minute` provider calls per rolling
/// minute by sleeping after each full budget is spent, since the upstream
/// is rate-limited. Store writes are wrapped in the fixed retry/backoff
/// helper; fetch failures are not retried, matching the read path.
pub struct QuoteSyncJob<P, S> {
    provider: Arc<P>,
    store: Arc<S>,
    config: SyncConfig,
}

impl<P, S> QuoteSyncJob<P, S>
where
    P: QuoteProvider,
    S: QuoteStore,
{
    pub fn new(provider: Arc<P>, store: Arc<S>, config: SyncConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Sync every symbol, continuing past per-symbol failures.
    pub async fn run(&self, symbols: &[Symbol]) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut calls: u32 = 0;

        for symbol in symbols {
            calls += 1;
            let quote = match self.provider.fetch_quote(symbol).await {
                Ok(quote) => quote,
                Err(error) => {
                    warn!(symbol = %symbol, %error, "fetch failed; skipping symbol");
                    report.failed += 1;
                    self.throttle(calls).await;
                    continue;
                }
            };

            let persisted = with_retry(self.config.retries, self.config.backoff, || async {
                self.store.upsert(&quote).await
            })
            .await;

            match persisted {
                Ok(()) => report.synced += 1,
                Err(error) => {
                    warn!(symbol = %symbol, %error, "upsert failed after retries");
                    report.failed += 1;
                }
            }

            self.throttle(calls).await;
        }

        info!(
            synced = report.synced,
            failed = report.failed,
            "quote sync finished"
        );
        Ok(report)
    }

    /// Sleep out the rest of the minute after every full call budget.
    async fn throttle(&self, calls: u32) {
        if calls % self.config.calls_per_minute == 0 {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }
}

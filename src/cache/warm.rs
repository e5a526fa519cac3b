//! Warm full-keyspace quote cache with periodic wholesale reload.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::KeyedLock;
use crate::config::WarmCacheConfig;
use crate::domain::{Quote, Symbol};
use crate::error::{Error, Result};
use crate::port::{QuoteFilter, QuoteProvider, QuoteStore};

/// Quote cache that keeps the entire keyspace resident in memory.
///
/// The map is built from a full store scan at startup and replaced
/// wholesale every `reload_interval` by a background task, so it may lag
/// the store by up to one reload window; that staleness is the consistency
/// contract, not an accident. A true miss is repaired in place through the
/// same single-flight policy as [`QuoteCache`](crate::cache::QuoteCache),
/// visible to this process only until the next reload.
///
/// No lock is ever held across provider or store I/O: reloads build a
/// fresh map first and swap it in under the write lock as a single O(1)
/// replacement, and miss fetches run outside the map lock entirely.
pub struct WarmQuoteCache<P, S> {
    quotes: Arc<RwLock<HashMap<Symbol, Quote>>>,
    locks: KeyedLock<Symbol>,
    provider: Arc<P>,
    store: Arc<S>,
    page_size: u64,
    fetch_wait_timeout: Duration,
    shutdown_tx: watch::Sender<bool>,
    reload_task: Option<JoinHandle<()>>,
}

impl<P, S> std::fmt::Debug for WarmQuoteCache<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarmQuoteCache").finish_non_exhaustive()
    }
}

impl<P, S> WarmQuoteCache<P, S>
where
    P: QuoteProvider + 'static,
    S: QuoteStore + 'static,
{
    /// Build the initial map from a full store scan and start the reload task.
    ///
    /// Fails if the initial scan fails; the reload task is only started
    /// once a complete map exists.
    pub async fn start(provider: Arc<P>, store: Arc<S>, config: &WarmCacheConfig) -> Result<Self> {
        let initial = load_keyspace(store.as_ref(), config.page_size).await?;
        info!(symbols = initial.len(), "quote keyspace loaded");

        let quotes = Arc::new(RwLock::new(initial));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reload_task = tokio::spawn(reload_loop(
            Arc::clone(&quotes),
            Arc::clone(&store),
            config.reload_interval,
            config.page_size,
            shutdown_rx,
        ));

        Ok(Self {
            quotes,
            locks: KeyedLock::new(),
            provider,
            store,
            page_size: config.page_size,
            fetch_wait_timeout: config.fetch_wait_timeout,
            shutdown_tx,
            reload_task: Some(reload_task),
        })
    }

    /// Get the quote for `symbol`.
    ///
    /// A hit returns straight from the in-memory map. A miss fetches
    /// upstream under the symbol's lock (one flight per symbol) and
    /// repairs the map in place; it does not write through to the store.
    pub async fn get(&self, symbol: &Symbol) -> Result<Quote> {
        let deadline = Instant::now() + self.fetch_wait_timeout;

        loop {
            if let Some(quote) = self.quotes.read().get(symbol) {
                return Ok(quote.clone());
            }

            if self.locks.try_lock(symbol) {
                let result = self.fetch_and_repair(symbol).await;
                self.locks.unlock(symbol);
                return result;
            }

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

    /// Update-or-insert a quote in the document store, keyed by symbol.
    ///
    /// Does not touch the in-memory map: the new value becomes visible
    /// here at the next reload, or earlier if a miss repairs the symbol.
    pub async fn upsert(&self, quote: &Quote) -> Result<()> {
        self.store.upsert(quote).await
    }

    /// Paginated read-through to the document store, bypassing the map.
    ///
    /// For bulk scans, not the hot path.
    pub async fn get_many(&self, filter: &QuoteFilter) -> Result<Vec<Quote>> {
        let mut quotes = Vec::new();
        let mut page = 0;
        loop {
            let batch = self.store.scan_page(filter, page, self.page_size).await?;
            let last = (batch.len() as u64) < self.page_size;
            quotes.extend(batch);
            if last {
                return Ok(quotes);
            }
            page += 1;
        }
    }

    /// Run one reload cycle now: scan the whole keyspace and swap it in.
    ///
    /// On a scan failure the old map is kept; a partial map is never
    /// installed.
    pub async fn refresh(&self) -> Result<()> {
        let fresh = load_keyspace(self.store.as_ref(), self.page_size).await?;
        let count = fresh.len();
        *self.quotes.write() = fresh;
        debug!(symbols = count, "quote keyspace refreshed");
        Ok(())
    }

    /// Signal the reload task and wait for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.reload_task.take() {
            if let Err(error) = task.await {
                warn!(%error, "reload task did not shut down cleanly");
            }
        }
    }

    /// Number of symbols currently resident.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.read().len()
    }

    /// Returns true if no symbols are resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn fetch_and_repair(&self, symbol: &Symbol) -> Result<Quote> {
        let quote = self.provider.fetch_quote(symbol).await?;
        debug!(symbol = %symbol, "repaired missing quote from upstream");
        // Insert before the caller unlocks so woken waiters observe it.
        self.quotes.write().insert(symbol.clone(), quote.clone());
        Ok(quote)
    }
}

impl<P, S> Drop for WarmQuoteCache<P, S> {
    fn drop(&mut self) {
        if let Some(task) = self.reload_task.take() {
            task.abort();
        }
    }
}

/// Scan the whole keyspace into a fresh map. Holds no lock.
async fn load_keyspace<S: QuoteStore + ?Sized>(
    store: &S,
    page_size: u64,
) -> Result<HashMap<Symbol, Quote>> {
    let filter = QuoteFilter::all();
    let mut map = HashMap::new();
    let mut page = 0;
    loop {
        let batch = store.scan_page(&filter, page, page_size).await?;
        let last = (batch.len() as u64) < page_size;
        for quote in batch {
            map.insert(quote.symbol.clone(), quote);
        }
        if last {
            return Ok(map);
        }
        page += 1;
    }
}

/// Periodically rebuild the map until the shutdown signal fires.
///
/// A failed scan is logged and the loop goes back to waiting with the old
/// map intact.
async fn reload_loop<S: QuoteStore>(
    quotes: Arc<RwLock<HashMap<Symbol, Quote>>>,
    store: Arc<S>,
    reload_interval: Duration,
    page_size: u64,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tick = tokio::time::interval(reload_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately; the map was just loaded.
    tick.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("quote keyspace reload task stopping");
                return;
            }
            _ = tick.tick() => {
                match load_keyspace(store.as_ref(), page_size).await {
                    Ok(fresh) => {
                        let count = fresh.len();
                        *quotes.write() = fresh;
                        debug!(symbols = count, "quote keyspace reloaded");
                    }
                    Err(error) => {
                        warn!(%error, "keyspace reload failed; keeping stale map");
                    }
                }
            }
        }
    }
}

//! Scripted quote provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{Quote, Symbol};
use crate::error::{Error, Result};
use crate::port::QuoteProvider;

/// Build a test quote with sensible defaults.
pub fn quote(symbol: &str, latest_price: Decimal) -> Quote {
    Quote::new(symbol, latest_price, latest_price, "USD", Utc::now())
}

/// In-memory [`QuoteProvider`] that serves scripted responses and records
/// every call.
///
/// Unknown symbols and symbols scripted with [`fail`](Self::fail) produce
/// a provider error. An optional latency makes the fetch slow, which the
/// single-flight tests rely on.
#[derive(Default)]
pub struct ScriptedProvider {
    quotes: Mutex<HashMap<Symbol, Quote>>,
    failures: Mutex<HashMap<Symbol, String>>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `quote.symbol` with `quote`.
    #[must_use]
    pub fn with_quote(self, quote: Quote) -> Self {
        self.quotes.lock().insert(quote.symbol.clone(), quote);
        self
    }

    /// Delay every fetch by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script an error response for `symbol`.
    pub fn fail(&self, symbol: impl Into<Symbol>, message: impl Into<String>) {
        self.failures.lock().insert(symbol.into(), message.into());
    }

    /// Replace or add a scripted quote after construction.
    pub fn set_quote(&self, quote: Quote) {
        self.failures.lock().remove(&quote.symbol);
        self.quotes.lock().insert(quote.symbol.clone(), quote);
    }

    /// Number of `fetch_quote` calls seen so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = self.failures.lock().get(symbol) {
            return Err(Error::Provider(message.clone()));
        }

        self.quotes
            .lock()
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Provider(format!("unknown symbol '{symbol}'")))
    }
}

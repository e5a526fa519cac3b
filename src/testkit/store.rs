//! In-memory document store for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::Quote;
use crate::error::{Error, Result};
use crate::port::{QuoteFilter, QuoteStore};

/// [`QuoteStore`] backed by a map of JSON documents keyed by symbol.
///
/// Documents are stored as `serde_json::Value` and decoded on every scan,
/// so tests can inject malformed documents and observe
/// [`Error::InvalidStoredQuote`]. A `BTreeMap` keeps scan pagination
/// stable across calls.
#[derive(Default)]
pub struct InMemoryQuoteStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl InMemoryQuoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a document directly, bypassing the `QuoteStore` trait.
    ///
    /// Stands in for another process writing to the shared store.
    pub fn insert_raw(&self, symbol: impl Into<String>, document: Value) {
        self.documents.lock().insert(symbol.into(), document);
    }

    /// Delete a document. No-op if absent.
    pub fn remove(&self, symbol: &str) {
        self.documents.lock().remove(symbol);
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    /// Returns true if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn upsert(&self, quote: &Quote) -> Result<()> {
        let document = serde_json::to_value(quote)?;
        self.documents
            .lock()
            .insert(quote.symbol.as_str().to_string(), document);
        Ok(())
    }

    async fn scan_page(
        &self,
        filter: &QuoteFilter,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Quote>> {
        let documents: Vec<Value> = self.documents.lock().values().cloned().collect();

        let mut matching = Vec::new();
        for document in documents {
            let quote: Quote =
                serde_json::from_value(document).map_err(Error::InvalidStoredQuote)?;
            if filter.matches(&quote) {
                matching.push(quote);
            }
        }

        let start = usize::try_from(page * page_size).unwrap_or(usize::MAX);
        let size = usize::try_from(page_size).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(start).take(size).collect())
    }
}

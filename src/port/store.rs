//! Persistent document store port for quotes.

use async_trait::async_trait;

use crate::domain::{Quote, Symbol};
use crate::error::Result;

/// Filter for store scans. An empty filter matches every document.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Restrict to these symbols.
    pub symbols: Option<Vec<Symbol>>,
    /// Restrict to quotes in this currency.
    pub currency: Option<String>,
}

impl QuoteFilter {
    /// Filter matching every stored quote.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching a single symbol.
    pub fn symbol(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbols: Some(vec![symbol.into()]),
            currency: None,
        }
    }

    /// Whether a quote passes this filter.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        if let Some(symbols) = &self.symbols {
            if !symbols.contains(&quote.symbol) {
                return false;
            }
        }
        if let Some(currency) = &self.currency {
            if quote.currency != *currency {
                return false;
            }
        }
        true
    }
}

/// Storage operations for quote documents.
///
/// The store is assumed available and non-expiring; freshness is the
/// cache's problem, not the store's.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Update-or-insert a quote, keyed by its symbol.
    ///
    /// Writing the same quote twice leaves the store in the same
    /// observable state as writing it once.
    async fn upsert(&self, quote: &Quote) -> Result<()>;

    /// Read one page of quotes matching the filter.
    ///
    /// Pages are zero-based; a page shorter than `page_size` is the last.
    async fn scan_page(
        &self,
        filter: &QuoteFilter,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Quote>>;
}

//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams to the two external collaborators the cache needs:
//! the upstream market-data provider and the persistent document store.
//! Adapters implement them; the cache consumes them behind `Arc`.

mod provider;
mod store;

pub use provider::QuoteProvider;
pub use store::{QuoteFilter, QuoteStore};

//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`provider`](self) — [`ScriptedProvider`], a recording fake for
//!   [`QuoteProvider`](crate::port::QuoteProvider), plus the [`quote`]
//!   fixture builder.
//! - [`store`](self) — [`InMemoryQuoteStore`], a JSON-document fake for
//!   [`QuoteStore`](crate::port::QuoteStore).

mod provider;
mod store;

pub use provider::{quote, ScriptedProvider};
pub use store::InMemoryQuoteStore;

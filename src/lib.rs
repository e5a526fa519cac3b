//! Quotecache - concurrent security-quote caching for a finance backend.
//!
//! This crate is the quote-serving core that sits between many concurrent
//! callers and a slow, rate-limited upstream market-data API. It collapses
//! simultaneous cache misses for one symbol into a single upstream call,
//! keeps a large keyspace warm in memory while staying eventually
//! consistent with a backing document store, and propagates upstream
//! failures without cascading.
//!
//! # Architecture
//!
//! Two cache fronts share the same single-flight primitive:
//!
//! - [`cache::QuoteCache`] - cache-aside with dedup: a TTL cache backed
//!   directly by the provider, for bounded working sets.
//! - [`cache::WarmQuoteCache`] - the entire keyspace resident in memory,
//!   rebuilt from the document store on a timer and repaired in place on
//!   a true miss.
//!
//! External collaborators are ports: [`port::QuoteProvider`] (upstream
//! API) and [`port::QuoteStore`] (document store). The crate never holds
//! a map lock across I/O on either of them.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Quote and symbol value types
//! - [`error`] - Error types for the crate
//! - [`port`] - Trait definitions for the provider and the store
//! - [`cache`] - Keyed locking, TTL storage, and the cache fronts
//! - [`ingest`] - Batch sync job and retry helpers
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quotecache::cache::QuoteCache;
//! use quotecache::config::CacheConfig;
//!
//! let provider = Arc::new(MyProvider::connect(api_key)?);
//! let cache = QuoteCache::new(provider, &CacheConfig::default());
//! let quote = cache.get(&"AAPL".into()).await?;
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

//! Quote caching: per-key locking, TTL storage, and the two cache fronts.
//!
//! - [`KeyedLock`] — one exclusion slot per key; the single-flight primitive.
//! - [`TtlCache`] — generic expiring map with a background sweep.
//! - [`QuoteCache`] — cache-aside reader over a TTL cache and a provider.
//! - [`WarmQuoteCache`] — whole keyspace resident in memory, reloaded from
//!   the document store on a timer.

mod keyed_lock;
mod quote_cache;
mod ttl;
mod warm;

pub use keyed_lock::KeyedLock;
pub use quote_cache::QuoteCache;
pub use ttl::TtlCache;
pub use warm::WarmQuoteCache;

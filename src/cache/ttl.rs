//! Generic time-expiring key/value store with a background sweep.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::config::CacheConfig;

/// Sweep period used when `cleanup_interval` is unset.
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry<V> {
    value: V,
    /// None means the entry never expires.
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Thread-safe map whose entries expire after a per-entry or default TTL.
///
/// Expired entries are evicted by a periodic background sweep and are also
/// filtered lazily on read, so callers never observe an expired value
/// regardless of sweep timing. "Expired" and "never set" are
/// indistinguishable to readers; both report absence.
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    default_ttl: Option<Duration>,
    sweeper: JoinHandle<()>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache and start its sweep task.
    ///
    /// `expiry_time` unset means entries never expire by default;
    /// `cleanup_interval` unset falls back to a 60s sweep.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let entries: Arc<RwLock<HashMap<K, Entry<V>>>> = Arc::new(RwLock::new(HashMap::new()));
        let sweep_every = config.cleanup_interval.unwrap_or(DEFAULT_CLEANUP_INTERVAL);

        let sweeper = {
            let entries = Arc::clone(&entries);
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(sweep_every);
                tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                // First tick completes immediately; skip it.
                tick.tick().await;
                loop {
                    tick.tick().await;
                    let now = Instant::now();
                    let mut map = entries.write();
                    let before = map.len();
                    map.retain(|_, entry| !entry.is_expired(now));
                    let evicted = before - map.len();
                    drop(map);
                    if evicted > 0 {
                        trace!(evicted, "ttl cache sweep");
                    }
                }
            })
        };

        Self {
            entries,
            default_ttl: config.expiry_time,
            sweeper,
        }
    }

    /// Store a value under the default TTL, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.default_ttl.map(|ttl| Instant::now() + ttl);
        self.entries.write().insert(key, Entry { value, expires_at });
    }

    /// Store a value with an explicit TTL, replacing any previous entry.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Some(Instant::now() + ttl);
        self.entries.write().insert(key, Entry { value, expires_at });
    }

    /// Get a value. Absent and expired entries both report `None`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let map = self.entries.read();
        let entry = map.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Evict every expired entry now, without waiting for the sweep task.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, entry| !entry.is_expired(now));
    }

    /// Number of entries, including not-yet-swept expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

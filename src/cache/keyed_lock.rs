//! Per-key mutual exclusion for single-flight fetch arbitration.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Notify;

/// A lock table with one exclusion slot per key.
///
/// Used to collapse concurrent cache-miss fetches for the same key into a
/// single upstream call: one caller claims the slot, the rest wait for it
/// to be released. Absence of an entry means unlocked; the entry is removed
/// on unlock so one-off keys leave no footprint behind.
///
/// # Invariant
///
/// Between a successful `try_lock(k)` and the matching `unlock(k)`, every
/// other `try_lock(k)` returns `false`.
pub struct KeyedLock<K: Eq + Hash> {
    slots: DashMap<K, Arc<Notify>>,
}

impl<K: Eq + Hash + Clone> KeyedLock<K> {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Attempt to claim the slot for `key` without blocking.
    ///
    /// Returns `true` if the slot was free (or absent) at that instant and
    /// is now held by the caller; `false` if another caller holds it.
    pub fn try_lock(&self, key: &K) -> bool {
        match self.slots.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Notify::new()));
                true
            }
        }
    }

    /// Release the slot for `key` and wake every waiter.
    ///
    /// No-op if the slot is not held. The bookkeeping entry is deleted;
    /// a later `try_lock` for the same key claims a fresh slot. Waiters
    /// still holding the old slot are woken after the removal, so none of
    /// them can miss the release.
    pub fn unlock(&self, key: &K) {
        if let Some((_, notify)) = self.slots.remove(key) {
            notify.notify_waiters();
        }
    }

    /// Wait until the slot for `key` is released.
    ///
    /// Returns immediately when the key is unlocked. Interest in the
    /// notification is registered before re-reading the slot, and the wait
    /// proceeds only if the slot observed first is still the one installed:
    /// an absent or *different* slot means the original hold was already
    /// released (and the key possibly re-locked), so the caller must
    /// re-check its own state rather than await a signal that already
    /// fired. Dropping the returned future cancels the wait.
    pub async fn wait(&self, key: &K) {
        let notify = match self.slots.get(key) {
            None => return,
            Some(slot) => Arc::clone(slot.value()),
        };

        let notified = notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        // Released between lookup and registration. Comparing by pointer
        // catches a release followed by a fresh claim of the same key.
        match self.slots.get(key) {
            Some(slot) if Arc::ptr_eq(slot.value(), &notify) => {}
            _ => return,
        }

        notified.await;
    }

    /// Number of currently held slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no slot is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLock<K> {
    fn default() -> Self {
        Self::new()
    }
}

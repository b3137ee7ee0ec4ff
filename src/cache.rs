//! Time-bounded memoization for fetch functions.
//!
//! [`ExpiringCache`] maps a key to an immutable value and the instant it was
//! stored. A read is served from the store only while the entry is younger
//! than the TTL supplied with the call; an older entry behaves exactly like
//! a missing one and is replaced by the next computation.
//!
//! The TTL is passed per call rather than per cache so one store can serve
//! fetch kinds with different volatility. Values are handed out as
//! [`Arc`]s: a fresh computation swaps the whole entry, never mutates it.
//!
//! Concurrent misses on the same key may both run the compute function;
//! the last write wins.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Key → (value, timestamp) store with per-call TTL.
pub struct ExpiringCache<K, V, C = SystemClock> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: C,
}

impl<K, V> ExpiringCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for ExpiringCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> ExpiringCache<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    C: Clock,
{
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Return the stored value for `key` if it is younger than `ttl`.
    pub fn get(&self, key: &K, ttl: Duration) -> Option<Arc<V>> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Store `value` under `key` with the current time, replacing any
    /// previous entry.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            stored_at: self.clock.now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
        value
    }

    /// Serve `key` from the store while fresh; otherwise run `compute`,
    /// store its output and return it.
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key
    /// * `ttl` - Maximum age of a stored entry that is still served
    /// * `compute` - Produces the value on a miss; must not fail
    ///
    /// # Returns
    ///
    /// The shared value. No lock is held while `compute` runs, so concurrent
    /// misses on one key may each compute; the last write wins.
    pub async fn get_or_compute<F, Fut>(&self, key: K, ttl: Duration, compute: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(&key, ttl) {
            debug!(?key, "cache hit");
            return value;
        }
        debug!(?key, ?ttl, "cache miss; computing");
        let value = compute().await;
        self.insert(key, value)
    }

    /// Drop every entry regardless of age.
    pub fn clear_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "cache cleared");
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, C> fmt::Debug for ExpiringCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or_default();
        f.debug_struct("ExpiringCache").field("entries", &len).finish()
    }
}

//! In-memory token cache with weight-bounded LRU eviction.

use lru::LruCache;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::Hash;
use tracing::debug;

use super::stats::StatsCounters;
use super::weigher::{weigher_for, FixedWeigher, Weigher};
use super::{CacheEntry, CacheKey, CacheStats};
use crate::types::TokenCacheConfig;

struct Slot {
    entry: CacheEntry,
    weight: u64,
}

struct Inner {
    entries: LruCache<CacheKey, Slot>,
    weighted_size: u64,
}

/// Process-wide token cache keyed by [`CacheKey`].
///
/// The sum of entry weights never exceeds `max_weight` once a `store`
/// returns. Entries are evicted least-recently-used first, where both
/// `load` hits and `store` count as a use. Entries never expire by time.
///
/// All operations take `&self`; share the cache with `Arc`.
pub struct TokenCache {
    inner: Mutex<Inner>,
    weigher: Box<dyn Weigher>,
    max_weight: u64,
    stats: StatsCounters,
}

impl TokenCache {
    /// Create a cache sized by `config`.
    pub fn new(config: &TokenCacheConfig) -> Self {
        Self::from_parts(config.max_weight(), weigher_for(config))
    }

    /// Create a cache with an explicit weight bound and weigher.
    pub fn with_weigher(max_weight: u64, weigher: impl Weigher + 'static) -> Self {
        Self::from_parts(max_weight, Box::new(weigher))
    }

    /// Create a cache that holds at most `max_entries` entries.
    pub fn bounded_by_entries(max_entries: u64) -> Self {
        Self::with_weigher(max_entries, FixedWeigher::new(1))
    }

    fn from_parts(max_weight: u64, weigher: Box<dyn Weigher>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                weighted_size: 0,
            }),
            weigher,
            max_weight,
            stats: StatsCounters::default(),
        }
    }

    /// Look up an entry, marking it most recently used on a hit.
    pub fn load<Q>(&self, key: &Q) -> Option<CacheEntry>
    where
        CacheKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self
            .inner
            .lock()
            .entries
            .get(key)
            .map(|slot| slot.entry.clone());

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    /// Look up an entry without touching recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<CacheEntry>
    where
        CacheKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner
            .lock()
            .entries
            .peek(key)
            .map(|slot| slot.entry.clone())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        CacheKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.contains(key)
    }

    /// Insert or replace the entry for `key`, then evict least-recently-used
    /// entries until the total weight is within bounds.
    ///
    /// An entry heavier than the whole bound is evicted by its own store,
    /// along with any previous entry for `key`. Other entries are kept.
    pub fn store(&self, key: CacheKey, entry: CacheEntry) {
        let weight = self.weigher.weigh(&key, &entry);
        if weight > self.max_weight {
            self.reject_oversized(key, weight);
            return;
        }

        let mut evicted = Vec::new();

        let (entry_count, weighted_size) = {
            let mut inner = self.inner.lock();

            if let Some(previous) = inner.entries.put(key, Slot { entry, weight }) {
                inner.weighted_size -= previous.weight;
            }
            inner.weighted_size += weight;

            while inner.weighted_size > self.max_weight {
                match inner.entries.pop_lru() {
                    Some((evicted_key, slot)) => {
                        inner.weighted_size -= slot.weight;
                        evicted.push(evicted_key);
                    }
                    None => break,
                }
            }

            (inner.entries.len(), inner.weighted_size)
        };

        self.stats.record_store();
        self.stats.record_evictions(evicted.len() as u64);

        for key in &evicted {
            debug!(cache_key = %key, "Evicted token cache entry");
        }
        debug!(
            entry_count,
            weighted_size,
            max_weight = self.max_weight,
            evicted = evicted.len(),
            "Stored token cache entry"
        );
    }

    fn reject_oversized(&self, key: CacheKey, weight: u64) {
        {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.entries.pop(&key) {
                inner.weighted_size -= previous.weight;
            }
        }

        self.stats.record_store();
        self.stats.record_evictions(1);
        debug!(
            cache_key = %key,
            weight,
            max_weight = self.max_weight,
            "Evicted token cache entry heavier than the bound"
        );
    }

    /// Remove the entry for `key`, returning it if present.
    pub fn invalidate<Q>(&self, key: &Q) -> Option<CacheEntry>
    where
        CacheKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        let slot = inner.entries.pop(key)?;
        inner.weighted_size -= slot.weight;
        Some(slot.entry)
    }

    /// Remove every entry.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.weighted_size = 0;
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Sum of the weights of all retained entries.
    pub fn weighted_size(&self) -> u64 {
        self.inner.lock().weighted_size
    }

    pub fn max_weight(&self) -> u64 {
        self.max_weight
    }

    pub fn stats(&self) -> CacheStats {
        let (entry_count, weighted_size) = {
            let inner = self.inner.lock();
            (inner.entries.len(), inner.weighted_size)
        };
        self.stats.snapshot(entry_count, weighted_size, self.max_weight)
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.inner
            .lock()
            .entries
            .iter()
            .rev()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(&TokenCacheConfig::default())
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TokenCache")
            .field("entry_count", &inner.entries.len())
            .field("weighted_size", &inner.weighted_size)
            .field("max_weight", &self.max_weight)
            .finish()
    }
}

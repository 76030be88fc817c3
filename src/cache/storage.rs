//! Token Cache Storage
//!
//! The seam the confidential client reads and writes serialized token sets through.

use parking_lot::Mutex;
use std::collections::HashMap;

use super::{CacheEntry, CacheKey, TokenCache};

/// Token cache storage interface.
///
/// Implementations must be safe to call from many tasks at once without
/// external locking. None of the operations can fail.
pub trait TokenCacheStorage: Send + Sync {
    /// Load the token set stored under `key`.
    fn load(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Insert or replace the token set stored under `key`.
    fn store(&self, key: CacheKey, entry: CacheEntry);

    /// Drop the token set stored under `key`.
    fn invalidate(&self, key: &CacheKey) -> bool;
}

impl TokenCacheStorage for TokenCache {
    fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        TokenCache::load(self, key)
    }

    fn store(&self, key: CacheKey, entry: CacheEntry) {
        TokenCache::store(self, key, entry)
    }

    fn invalidate(&self, key: &CacheKey) -> bool {
        TokenCache::invalidate(self, key).is_some()
    }
}

/// Mock token cache storage for testing.
#[derive(Default)]
pub struct MockTokenCacheStorage {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    load_history: Mutex<Vec<CacheKey>>,
    store_history: Mutex<Vec<(CacheKey, CacheEntry)>>,
}

impl MockTokenCacheStorage {
    /// Create new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry.
    pub fn add_entry(&self, key: CacheKey, entry: CacheEntry) -> &Self {
        self.entries.lock().insert(key, entry);
        self
    }

    /// Get load history.
    pub fn get_load_history(&self) -> Vec<CacheKey> {
        self.load_history.lock().clone()
    }

    /// Get store history.
    pub fn get_store_history(&self) -> Vec<(CacheKey, CacheEntry)> {
        self.store_history.lock().clone()
    }
}

impl TokenCacheStorage for MockTokenCacheStorage {
    fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.load_history.lock().push(key.clone());
        self.entries.lock().get(key).cloned()
    }

    fn store(&self, key: CacheKey, entry: CacheEntry) {
        self.store_history
            .lock()
            .push((key.clone(), entry.clone()));
        self.entries.lock().insert(key, entry);
    }

    fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.lock().remove(key).is_some()
    }
}

/// Create mock token cache storage for testing.
pub fn create_mock_token_cache_storage() -> MockTokenCacheStorage {
    MockTokenCacheStorage::new()
}

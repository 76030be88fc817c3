//! Entry weighing.

use super::{CacheEntry, CacheKey};
use crate::types::{TokenCacheConfig, WeighingStrategy};

/// Computes the weight an entry is charged against the cache bound.
pub trait Weigher: Send + Sync {
    fn weigh(&self, key: &CacheKey, entry: &CacheEntry) -> u64;
}

/// Charges every entry the same estimated size.
///
/// This is an approximation: real token sets vary with scope count and
/// token length, but measuring is skipped on the write path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedWeigher {
    weight: u64,
}

impl FixedWeigher {
    pub fn new(weight: u64) -> Self {
        Self { weight }
    }
}

impl Weigher for FixedWeigher {
    fn weigh(&self, _key: &CacheKey, _entry: &CacheEntry) -> u64 {
        self.weight
    }
}

/// Charges each entry its serialized length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializedSizeWeigher;

impl Weigher for SerializedSizeWeigher {
    fn weigh(&self, _key: &CacheKey, entry: &CacheEntry) -> u64 {
        entry.len() as u64
    }
}

/// Build the weigher selected by a cache configuration.
pub fn weigher_for(config: &TokenCacheConfig) -> Box<dyn Weigher> {
    match config.weighing {
        WeighingStrategy::FixedEstimate => Box::new(FixedWeigher::new(config.average_entry_size)),
        WeighingStrategy::SerializedSize => Box::new(SerializedSizeWeigher),
    }
}

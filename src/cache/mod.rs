//! Token Cache
//!
//! In-memory store of serialized token sets, one per (application, tenant)
//! pair, bounded by total weight with least-recently-used eviction.
//!
//! This module provides:
//!
//! - **Keys**: `{client_id}_{tenant_id}_AppTokenCache`
//! - **Entries**: opaque byte blobs, measured only for weighting
//! - **Weighers**: fixed per-entry estimate or serialized size
//! - **TokenCache**: the bounded LRU store
//! - **TokenCacheStorage**: the trait the client depends on, plus a mock

pub mod entry;
pub mod key;
pub mod memory;
pub mod stats;
pub mod storage;
pub mod weigher;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use memory::TokenCache;
pub use stats::CacheStats;
pub use storage::{create_mock_token_cache_storage, MockTokenCacheStorage, TokenCacheStorage};
pub use weigher::{weigher_for, FixedWeigher, SerializedSizeWeigher, Weigher};

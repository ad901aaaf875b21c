//! Caching layers shielding the metadata provider and the data store.
//!
//! - [`lru::TtlLruCache`]: the in-process capacity/TTL bounded map.
//! - [`service::CacheService`]: typed get/set facade, one instance per
//!   logical cache.
//! - [`store::SharedCacheStore`]: string-keyed store with explicit TTLs
//!   (Redis or the local fallback).
//! - [`series::SeriesCache`] / [`episodes::EpisodesCache`]: read-through
//!   caches keyed by domain identifiers.

use thiserror::Error;

pub mod episodes;
pub mod keys;
pub mod lru;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod series;
pub mod service;
pub mod store;
pub mod ttl;

pub use episodes::{EpisodesCache, SharedEpisodesCache};
pub use keys::CacheKeys;
pub use lru::TtlLruCache;
#[cfg(feature = "redis")]
pub use redis_store::RedisCacheStore;
pub use series::{LocalSeriesCache, SeriesCache, SharedSeriesCache};
pub use service::{CacheService, TtlCacheService};
pub use store::{LocalCacheStore, SharedCacheStore};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: usize },
}

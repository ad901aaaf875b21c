use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use popcorn_model::{SeriesId, TvSeries};
use tracing::{debug, error, warn};

use super::{
    CacheError, CacheKeys, CacheService, SharedCacheStore, TtlCacheService,
    ttl,
};

/// Read-through cache of series snapshots keyed by catalog id.
#[async_trait]
pub trait SeriesCache: Send + Sync {
    async fn get(&self, id: SeriesId) -> Option<TvSeries>;

    /// Returns only the hits; callers diff against `ids` to find misses.
    async fn get_many(&self, ids: &[SeriesId]) -> Vec<TvSeries>;

    /// Returns whether the snapshot was stored.
    async fn set(&self, series: &TvSeries) -> bool;
}

/// Series cache on top of a [`SharedCacheStore`] with the domain-aware
/// TTL policy from [`ttl::series_ttl`].
#[derive(Clone)]
pub struct SharedSeriesCache {
    store: Arc<dyn SharedCacheStore>,
}

impl fmt::Debug for SharedSeriesCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSeriesCache")
            .field("store", &self.store)
            .finish()
    }
}

impl SharedSeriesCache {
    pub fn new(store: Arc<dyn SharedCacheStore>) -> Self {
        Self { store }
    }

    fn decode(id: SeriesId, raw: &str) -> Option<TvSeries> {
        match serde_json::from_str(raw) {
            Ok(series) => Some(series),
            Err(e) => {
                warn!("Discarding undecodable cache entry for series {}: {}", id, e);
                None
            }
        }
    }
}

#[async_trait]
impl SeriesCache for SharedSeriesCache {
    async fn get(&self, id: SeriesId) -> Option<TvSeries> {
        match self.store.get(&CacheKeys::series(id)).await {
            Ok(raw) => raw.and_then(|raw| Self::decode(id, &raw)),
            Err(e) => {
                warn!("Series cache read failed for {}: {}", id, e);
                None
            }
        }
    }

    async fn get_many(&self, ids: &[SeriesId]) -> Vec<TvSeries> {
        if ids.is_empty() {
            return Vec::new();
        }

        let keys: Vec<String> = ids.iter().copied().map(CacheKeys::series).collect();
        let values = match self.store.get_many(&keys).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Series cache batch read failed: {}", e);
                return Vec::new();
            }
        };

        let found: Vec<TvSeries> = ids
            .iter()
            .zip(values)
            .filter_map(|(id, raw)| raw.and_then(|raw| Self::decode(*id, &raw)))
            .collect();
        debug!("Series cache batch: {}/{} hits", found.len(), ids.len());
        found
    }

    async fn set(&self, series: &TvSeries) -> bool {
        let ttl = ttl::series_ttl(series, Utc::now().date_naive());
        let json = match serde_json::to_string(series) {
            Ok(json) => json,
            Err(e) => {
                error!("Could not serialize series {}: {}", series.id, e);
                return false;
            }
        };

        match self.store.set(&CacheKeys::series(series.id), json, ttl).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Could not cache series {}: {}", series.id, e);
                false
            }
        }
    }
}

/// Process-local series cache with one fixed TTL for every entry.
pub struct LocalSeriesCache {
    cache: TtlCacheService<SeriesId, TvSeries>,
}

impl fmt::Debug for LocalSeriesCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSeriesCache")
            .field("cache", &self.cache)
            .finish()
    }
}

impl LocalSeriesCache {
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, CacheError> {
        Ok(Self {
            cache: TtlCacheService::with_ttl(capacity, ttl)?,
        })
    }
}

#[async_trait]
impl SeriesCache for LocalSeriesCache {
    async fn get(&self, id: SeriesId) -> Option<TvSeries> {
        self.cache.try_get_value(&id)
    }

    async fn get_many(&self, ids: &[SeriesId]) -> Vec<TvSeries> {
        ids.iter()
            .filter_map(|id| self.cache.try_get_value(id))
            .collect()
    }

    async fn set(&self, series: &TvSeries) -> bool {
        self.cache.set(series.id, series.clone());
        true
    }
}

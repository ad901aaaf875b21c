use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{CacheError, TtlLruCache};
use crate::error::Result;

/// String-keyed cache store with explicit per-key TTLs, shared by the
/// domain read-through caches. Values are JSON documents.
#[async_trait]
pub trait SharedCacheStore: Send + Sync + fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Batch read; the result is positionally aligned with `keys`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Returns whether the store accepted the write.
    async fn set(&self, key: &str, value: String, ttl: Duration)
    -> Result<bool>;

    /// Remaining lifetime of `key`, `None` when absent or without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;
}

/// In-process [`SharedCacheStore`] used when no Redis instance is
/// configured. Bounded by an LRU so a long-running process cannot grow it
/// without limit.
pub struct LocalCacheStore {
    entries: TtlLruCache<String, String>,
}

impl fmt::Debug for LocalCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCacheStore")
            .field("entries", &self.entries)
            .finish()
    }
}

impl LocalCacheStore {
    pub fn new(
        capacity: usize,
        default_ttl: Duration,
    ) -> std::result::Result<Self, CacheError> {
        Ok(Self {
            entries: TtlLruCache::new(capacity, default_ttl)?,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SharedCacheStore for LocalCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.entries.try_get(&key.to_string());
        debug!(
            "Cache {}: {}",
            if value.is_some() { "HIT" } else { "MISS" },
            key
        );
        Ok(value)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        Ok(keys.iter().map(|key| self.entries.try_get(key)).collect())
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<bool> {
        debug!("Cache SET: {} (TTL: {:?})", key, ttl);
        self.entries.set_with_ttl(key.to_string(), value, ttl);
        Ok(true)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        Ok(self.entries.remaining_ttl(&key.to_string()))
    }
}

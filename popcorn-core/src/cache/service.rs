use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use super::{CacheError, TtlLruCache};

/// Typed get/set capability call sites depend on instead of a concrete
/// cache.
pub trait CacheService<K, V>: Send + Sync {
    fn try_get_value(&self, key: &K) -> Option<V>;

    fn set(&self, key: K, value: V);
}

/// [`CacheService`] backed by one [`TtlLruCache`] instance.
pub struct TtlCacheService<K, V> {
    cache: TtlLruCache<K, V>,
}

impl<K, V> fmt::Debug for TtlCacheService<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCacheService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V> TtlCacheService<K, V> {
    pub fn new(
        capacity: usize,
        expiration_in_hours: u64,
    ) -> Result<Self, CacheError> {
        Self::with_ttl(
            capacity,
            Duration::from_secs(expiration_in_hours.saturating_mul(3600)),
        )
    }

    pub fn with_ttl(capacity: usize, ttl: Duration) -> Result<Self, CacheError> {
        Ok(Self {
            cache: TtlLruCache::new(capacity, ttl)?,
        })
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }
}

impl<K, V> CacheService<K, V> for TtlCacheService<K, V>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
{
    fn try_get_value(&self, key: &K) -> Option<V> {
        self.cache.try_get(key)
    }

    fn set(&self, key: K, value: V) {
        self.cache.set(key, value);
    }
}

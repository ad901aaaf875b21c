use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use super::SharedCacheStore;
use crate::error::{PopcornError, Result};

/// Millisecond expiry for `SET .. PX`. PX rejects zero, so sub-millisecond
/// lifetimes round up to one.
fn px_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Redis-backed [`SharedCacheStore`]. Expirations are delegated to Redis
/// (`SET .. PX`), remaining lifetimes come from `PTTL`.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis cache at {}", redis_url);

        let client = redis::Client::open(redis_url).map_err(|e| {
            PopcornError::Store(format!("Failed to create Redis client: {e}"))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            PopcornError::Store(format!("Failed to connect to Redis: {e}"))
        })?;

        info!("Successfully connected to Redis cache");

        Ok(Self { conn })
    }
}

#[async_trait]
impl SharedCacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        debug!("Cache GET: {}", key);

        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(key).await.map_err(|e| {
            PopcornError::Store(format!("Redis GET failed: {e}"))
        })?;

        match &data {
            Some(_) => debug!("Cache HIT: {}", key),
            None => debug!("Cache MISS: {}", key),
        }
        Ok(data)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Cache MGET: {} keys", keys.len());

        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(key);
        }

        let mut conn = self.conn.clone();
        cmd.query_async::<Vec<Option<String>>>(&mut conn)
            .await
            .map_err(|e| PopcornError::Store(format!("Redis MGET failed: {e}")))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<bool> {
        debug!("Cache SET: {} (TTL: {:?})", key, ttl);

        let millis = px_millis(ttl);
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| {
                PopcornError::Store(format!("Redis SET failed: {e}"))
            })?;

        Ok(true)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.conn.clone();
        let millis: i64 = redis::cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                PopcornError::Store(format!("Redis PTTL failed: {e}"))
            })?;

        // -2: key missing, -1: key without expiry.
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use popcorn_model::{Episode, SeriesId};
use tracing::{error, warn};

use super::{CacheKeys, SharedCacheStore, ttl};

/// Read-through cache of a season's episode list.
#[async_trait]
pub trait EpisodesCache: Send + Sync {
    async fn get(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Option<Vec<Episode>>;

    /// Stores `episodes` grouped per (series, season). Returns `true` only
    /// if every group was stored.
    async fn set(&self, episodes: &[Episode]) -> bool;
}

/// Episodes cache on top of a [`SharedCacheStore`]. Each season list
/// inherits the remaining lifetime of its parent series entry.
#[derive(Clone)]
pub struct SharedEpisodesCache {
    store: Arc<dyn SharedCacheStore>,
}

impl fmt::Debug for SharedEpisodesCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEpisodesCache")
            .field("store", &self.store)
            .finish()
    }
}

impl SharedEpisodesCache {
    pub fn new(store: Arc<dyn SharedCacheStore>) -> Self {
        Self { store }
    }

    async fn store_group(
        &self,
        series_id: SeriesId,
        season_number: u16,
        group: &[&Episode],
    ) -> bool {
        let parent_ttl = match self.store.ttl(&CacheKeys::series(series_id)).await
        {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!("Could not read TTL of series {}: {}", series_id, e);
                None
            }
        };

        let json = match serde_json::to_string(group) {
            Ok(json) => json,
            Err(e) => {
                error!(
                    "Could not serialize episodes for series {}, season {}: {}",
                    series_id, season_number, e
                );
                return false;
            }
        };

        let key = CacheKeys::season_episodes(series_id, season_number);
        match self.store.set(&key, json, ttl::episodes_ttl(parent_ttl)).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Could not cache {}: {}", key, e);
                false
            }
        }
    }
}

#[async_trait]
impl EpisodesCache for SharedEpisodesCache {
    async fn get(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Option<Vec<Episode>> {
        let key = CacheKeys::season_episodes(series_id, season_number);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Episodes cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(episodes) => Some(episodes),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, episodes: &[Episode]) -> bool {
        let mut groups: BTreeMap<(SeriesId, u16), Vec<&Episode>> =
            BTreeMap::new();
        for episode in episodes {
            groups
                .entry((episode.series_id, episode.season_number))
                .or_default()
                .push(episode);
        }

        let writes = groups.iter().map(|((series_id, season), group)| {
            self.store_group(*series_id, *season, group)
        });

        join_all(writes).await.into_iter().all(|stored| stored)
    }
}

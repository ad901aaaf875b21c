use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use popcorn_model::{SearchTvSeriesResponse, SeriesId, TvSeries};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::cancel::cancellable;
use crate::cache::{CacheKeys, CacheService, SeriesCache};
use crate::error::Result;
use crate::providers::MetadataProvider;

pub type SearchCache = dyn CacheService<String, SearchTvSeriesResponse>;

/// Series lookups: catalog search and read-through hydration by id.
#[derive(Clone)]
pub struct SeriesService {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn SeriesCache>,
    search_cache: Arc<SearchCache>,
}

impl fmt::Debug for SeriesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesService").finish_non_exhaustive()
    }
}

impl SeriesService {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn SeriesCache>,
        search_cache: Arc<SearchCache>,
    ) -> Self {
        Self {
            provider,
            cache,
            search_cache,
        }
    }

    /// Catalog search, memoized per (query, page) in the search cache.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<SearchTvSeriesResponse> {
        let key = CacheKeys::search(query, page);
        if let Some(cached) = self.search_cache.try_get_value(&key) {
            debug!("Cache hit for series query {:?}, page {}", query, page);
            return Ok(cached);
        }

        let response = cancellable(cancel, "series search", async {
            Ok(self.provider.search_series(query, page).await?)
        })
        .await?;

        self.search_cache.set(key, response.clone());
        Ok(response)
    }

    /// Cached series, else the catalog's copy, which is then cached.
    pub async fn get_by_id(
        &self,
        id: SeriesId,
        cancel: &CancellationToken,
    ) -> Result<Option<TvSeries>> {
        if let Some(series) = self.cache.get(id).await {
            debug!("Cache hit for series {}", id);
            return Ok(Some(series));
        }

        cancellable(cancel, "series lookup", self.fetch_and_cache(id)).await
    }

    /// Resolves `ids` through the cache and fetches the misses one at a
    /// time. Ids the catalog does not know are dropped. The result follows
    /// the order of `ids`.
    pub async fn get_many(
        &self,
        ids: &[SeriesId],
        cancel: &CancellationToken,
    ) -> Result<Vec<TvSeries>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = self.cache.get_many(ids).await;
        let cached: HashSet<SeriesId> =
            found.iter().map(|series| series.id).collect();
        let mut seen = HashSet::new();
        let missing: Vec<SeriesId> = ids
            .iter()
            .copied()
            .filter(|id| !cached.contains(id) && seen.insert(*id))
            .collect();

        if missing.is_empty() {
            debug!("All {} series served from cache", ids.len());
            return Ok(in_request_order(ids, found));
        }

        for id in missing {
            let fetched =
                cancellable(cancel, "series hydration", self.fetch_and_cache(id))
                    .await?;
            found.extend(fetched);
        }

        debug!(
            "Hydrated {} of {} requested series ({} from cache)",
            found.len(),
            ids.len(),
            cached.len()
        );
        Ok(in_request_order(ids, found))
    }

    async fn fetch_and_cache(&self, id: SeriesId) -> Result<Option<TvSeries>> {
        let Some(series) = self.provider.get_series(id).await? else {
            warn!("No catalog series found for id {}", id);
            return Ok(None);
        };

        if !self.cache.set(&series).await {
            error!("Could not cache series {}", id);
        }
        Ok(Some(series))
    }
}

fn in_request_order(ids: &[SeriesId], found: Vec<TvSeries>) -> Vec<TvSeries> {
    let mut ordered = Vec::with_capacity(found.len());
    let mut pool = found;
    for id in ids {
        if let Some(pos) = pool.iter().position(|series| series.id == *id) {
            ordered.push(pool.swap_remove(pos));
        }
    }
    ordered
}

use std::fmt;
use std::sync::Arc;

use popcorn_model::{Season, SeriesId};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::cancel::cancellable;
use crate::cache::SeriesCache;
use crate::error::Result;
use crate::providers::MetadataProvider;

#[derive(Clone)]
pub struct SeasonService {
    provider: Arc<dyn MetadataProvider>,
    series_cache: Arc<dyn SeriesCache>,
}

impl fmt::Debug for SeasonService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeasonService").finish_non_exhaustive()
    }
}

impl SeasonService {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        series_cache: Arc<dyn SeriesCache>,
    ) -> Self {
        Self {
            provider,
            series_cache,
        }
    }

    /// Answers from the cached series' season list when the series is
    /// cached; otherwise asks the catalog. Catalog answers are not cached.
    pub async fn get_season(
        &self,
        series_id: SeriesId,
        season_number: u16,
        cancel: &CancellationToken,
    ) -> Result<Option<Season>> {
        if let Some(series) = self.series_cache.get(series_id).await {
            debug!(
                "Cache hit for series {} on season {} lookup",
                series_id, season_number
            );
            return Ok(series.season(season_number).cloned());
        }

        cancellable(cancel, "season lookup", async {
            Ok(self.provider.get_season(series_id, season_number).await?)
        })
        .await
    }
}

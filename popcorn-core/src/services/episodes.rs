use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use popcorn_model::{CompletedEpisodeRecord, Episode, EpisodeKey, SeriesId, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::cancel::cancellable;
use crate::cache::EpisodesCache;
use crate::database::CompletedEpisodeRepository;
use crate::error::Result;
use crate::providers::MetadataProvider;

#[derive(Clone)]
pub struct EpisodeService {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn EpisodesCache>,
    repository: Arc<dyn CompletedEpisodeRepository>,
}

impl fmt::Debug for EpisodeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpisodeService").finish_non_exhaustive()
    }
}

impl EpisodeService {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn EpisodesCache>,
        repository: Arc<dyn CompletedEpisodeRepository>,
    ) -> Self {
        Self {
            provider,
            cache,
            repository,
        }
    }

    pub async fn get_episodes(
        &self,
        series_id: SeriesId,
        season_number: u16,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<Episode>>> {
        if let Some(episodes) = self.cache.get(series_id, season_number).await {
            debug!(
                "Cache hit for episodes of series {}, season {}",
                series_id, season_number
            );
            return Ok(Some(episodes));
        }

        let fetched = cancellable(cancel, "episodes lookup", async {
            Ok(self.provider.get_episodes(series_id, season_number).await?)
        })
        .await?;

        let Some(episodes) = fetched else {
            return Ok(None);
        };

        if !episodes.is_empty() && !self.cache.set(&episodes).await {
            error!(
                "Could not cache episodes for series {}, season {}",
                series_id, season_number
            );
        }
        Ok(Some(episodes))
    }

    /// Looks inside the cached season first; a cached season that lacks
    /// the episode answers `None` without asking the catalog.
    pub async fn get_episode(
        &self,
        series_id: SeriesId,
        season_number: u16,
        episode_number: u16,
        cancel: &CancellationToken,
    ) -> Result<Option<Episode>> {
        if let Some(episodes) = self.cache.get(series_id, season_number).await {
            debug!(
                "Cache hit for episodes of series {}, season {}",
                series_id, season_number
            );
            return Ok(episodes
                .into_iter()
                .find(|episode| episode.episode_number == episode_number));
        }

        cancellable(cancel, "episode lookup", async {
            Ok(self
                .provider
                .get_episode(series_id, season_number, episode_number)
                .await?)
        })
        .await
    }

    /// Returns `true` when the episode was newly marked.
    pub async fn mark_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let rows = cancellable(
            cancel,
            "mark episode completed",
            self.repository.add_to_completed(user_id, key, Utc::now()),
        )
        .await?;
        Ok(rows > 0)
    }

    /// Returns `true` when a completion was removed.
    pub async fn unmark_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let rows = cancellable(
            cancel,
            "unmark episode completed",
            self.repository.remove_from_completed(user_id, key),
        )
        .await?;
        Ok(rows > 0)
    }

    pub async fn get_completed(
        &self,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<CompletedEpisodeRecord>> {
        cancellable(
            cancel,
            "completed episodes",
            self.repository.get_completed(user_id),
        )
        .await
    }
}

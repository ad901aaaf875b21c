use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popcorn_model::{CompletedEpisodeRecord, EpisodeKey, UserId};

use crate::error::Result;

#[async_trait]
pub trait CompletedEpisodeRepository: Send + Sync {
    /// Insert-or-ignore; returns 0 when already completed.
    async fn add_to_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
        completed_at: DateTime<Utc>,
    ) -> Result<u64>;

    async fn remove_from_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
    ) -> Result<u64>;

    /// Most recently completed first.
    async fn get_completed(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CompletedEpisodeRecord>>;
}

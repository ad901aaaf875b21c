use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popcorn_model::{SeriesId, TrackedSeriesState, TrackingRecord, UserId};

use crate::error::Result;

/// Storage of (user, series) memberships, one set per tracking state.
///
/// `Watching` and `Stopped` share one set and differ by a stopped flag.
/// Writes report affected rows so callers can tell a no-op from a change.
#[async_trait]
pub trait TrackedSeriesRepository: Send + Sync {
    /// Insert-or-ignore into the set backing `state`. Returns 0 when the
    /// pair was already present. `Stopped` is not an insertable state.
    async fn add(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
        at: DateTime<Utc>,
    ) -> Result<u64>;

    /// Removes the pair from the set backing `state`. For `Watching` the
    /// row goes regardless of its stopped flag; for `Stopped` only a
    /// stopped row matches.
    async fn remove(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
    ) -> Result<u64>;

    /// Flags an existing watching row as stopped.
    async fn stop_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        at: DateTime<Utc>,
    ) -> Result<u64>;

    /// Clears the stopped flag of a stopped watching row.
    async fn resume_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        at: DateTime<Utc>,
    ) -> Result<u64>;

    /// Memberships in `state`, most recent first.
    async fn records(
        &self,
        user_id: UserId,
        state: TrackedSeriesState,
    ) -> Result<Vec<TrackingRecord>>;

    async fn ids(
        &self,
        user_id: UserId,
        state: TrackedSeriesState,
    ) -> Result<Vec<SeriesId>> {
        Ok(self
            .records(user_id, state)
            .await?
            .into_iter()
            .map(|record| record.series_id)
            .collect())
    }
}

//! Tracked-series state machine.
//!
//! A (user, series) pair lives in at most one of watchlist, watching and
//! completed. Transitions write the target state first and then remove the
//! pair from the states it leaves. The two steps are not transactional: an
//! interruption between them leaves the pair in both sets until the next
//! successful transition removes the stale membership.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use popcorn_model::{SeriesId, TrackedSeriesState, TvSeries, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::SeriesService;
use super::cancel::cancellable;
use crate::database::TrackedSeriesRepository;
use crate::error::{Result, TransitionError};

#[derive(Clone)]
pub struct TrackedSeriesService {
    repository: Arc<dyn TrackedSeriesRepository>,
    series: SeriesService,
}

impl fmt::Debug for TrackedSeriesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedSeriesService")
            .field("series", &self.series)
            .finish_non_exhaustive()
    }
}

/// States a pair leaves when it enters `target`.
fn superseded_by(target: TrackedSeriesState) -> &'static [TrackedSeriesState] {
    match target {
        TrackedSeriesState::Watchlist | TrackedSeriesState::Stopped => &[],
        TrackedSeriesState::Watching => &[TrackedSeriesState::Watchlist],
        TrackedSeriesState::Completed => &[
            TrackedSeriesState::Watchlist,
            TrackedSeriesState::Watching,
        ],
    }
}

impl TrackedSeriesService {
    pub fn new(
        repository: Arc<dyn TrackedSeriesRepository>,
        series: SeriesService,
    ) -> Self {
        Self { repository, series }
    }

    /// Moves the series into `state`. `Stopped` is rejected; use
    /// [`stop_watching`](Self::stop_watching).
    pub async fn track(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if !state.is_direct_target() {
            return Err(TransitionError::InvalidTarget { state }.into());
        }

        debug!(
            "Adding series {} to {} for user {}",
            series_id, state, user_id
        );
        let inserted = cancellable(
            cancel,
            "track series",
            self.repository.add(user_id, series_id, state, Utc::now()),
        )
        .await?;
        if inserted == 0 {
            debug!("Series {} already in {} for {}", series_id, state, user_id);
        }

        for &previous in superseded_by(state) {
            let removed =
                self.repository.remove(user_id, series_id, previous).await?;
            if removed > 0 {
                debug!(
                    "Removed series {} from {} for user {}",
                    series_id, previous, user_id
                );
            }
        }

        info!("Series {} is now {} for user {}", series_id, state, user_id);
        Ok(())
    }

    /// Removes the series from `state` only. Returns whether a membership
    /// was removed. Stopped series are untracked via `Watching`.
    pub async fn untrack(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if !state.is_direct_target() {
            return Err(TransitionError::InvalidTarget { state }.into());
        }

        debug!(
            "Deleting series {} from {} for user {}",
            series_id, state, user_id
        );
        let removed = cancellable(
            cancel,
            "untrack series",
            self.repository.remove(user_id, series_id, state),
        )
        .await?;
        Ok(removed > 0)
    }

    /// Flags a watched series as stopped. Fails with `series.not_started`
    /// when the series is not being watched.
    pub async fn stop_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("Stopping series {} for user {}", series_id, user_id);
        let rows = cancellable(
            cancel,
            "stop watching",
            self.repository.stop_watching(user_id, series_id, Utc::now()),
        )
        .await?;

        if rows == 0 {
            return Err(TransitionError::NotStarted { series_id }.into());
        }
        Ok(())
    }

    /// Moves a stopped series back to watching. Fails with
    /// `series.not_stopped` unless the series is stopped.
    pub async fn resume_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("Resuming series {} for user {}", series_id, user_id);
        let rows = cancellable(
            cancel,
            "resume watching",
            self.repository.resume_watching(user_id, series_id, Utc::now()),
        )
        .await?;

        if rows == 0 {
            return Err(TransitionError::NotStopped { series_id }.into());
        }
        Ok(())
    }

    /// Series in `state`, most recently tracked first. Series the catalog
    /// no longer knows are left out.
    pub async fn get_tracked(
        &self,
        user_id: UserId,
        state: TrackedSeriesState,
        cancel: &CancellationToken,
    ) -> Result<Vec<TvSeries>> {
        let ids = cancellable(
            cancel,
            "tracked series ids",
            self.repository.ids(user_id, state),
        )
        .await?;

        if ids.is_empty() {
            debug!("No {} entries for user {}", state, user_id);
            return Ok(Vec::new());
        }

        let series = self.series.get_many(&ids, cancel).await?;
        if series.len() < ids.len() {
            warn!(
                "{} of {} {} series for user {} could not be resolved",
                ids.len() - series.len(),
                ids.len(),
                state,
                user_id
            );
        }
        Ok(series)
    }
}

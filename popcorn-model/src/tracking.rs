use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ModelError;
use crate::ids::{SeriesId, UserId};

/// Where a series sits in a user's personal list.
///
/// `Stopped` shares storage with `Watching` and is only reachable by stopping
/// a series that is being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrackedSeriesState {
    Watchlist,
    Watching,
    Completed,
    Stopped,
}

impl TrackedSeriesState {
    pub const ALL: [TrackedSeriesState; 4] = [
        TrackedSeriesState::Watchlist,
        TrackedSeriesState::Watching,
        TrackedSeriesState::Completed,
        TrackedSeriesState::Stopped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedSeriesState::Watchlist => "watchlist",
            TrackedSeriesState::Watching => "watching",
            TrackedSeriesState::Completed => "completed",
            TrackedSeriesState::Stopped => "stopped",
        }
    }

    /// Whether `track` may target this state directly.
    pub fn is_direct_target(&self) -> bool {
        !matches!(self, TrackedSeriesState::Stopped)
    }
}

impl fmt::Display for TrackedSeriesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackedSeriesState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watchlist" => Ok(TrackedSeriesState::Watchlist),
            "watching" => Ok(TrackedSeriesState::Watching),
            "completed" => Ok(TrackedSeriesState::Completed),
            "stopped" => Ok(TrackedSeriesState::Stopped),
            other => Err(ModelError::UnknownTrackingState(other.to_string())),
        }
    }
}

/// A persisted (user, series) membership together with the timestamp used
/// for most-recent-first ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingRecord {
    pub user_id: UserId,
    pub series_id: SeriesId,
    pub state: TrackedSeriesState,
    /// Added, started, completed or stopped time depending on `state`.
    pub recorded_at: DateTime<Utc>,
}

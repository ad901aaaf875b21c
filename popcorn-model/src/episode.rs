use chrono::{DateTime, NaiveDate, Utc};

use crate::ids::{EpisodeKey, SeriesId, UserId};

/// Episode snapshot as reported by the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Episode {
    pub id: u64,
    pub series_id: SeriesId,
    pub season_number: u16,
    pub episode_number: u16,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overview: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episode_type: String,
    pub runtime: Option<u32>,
    pub release_date: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub still_url: String,
}

impl Episode {
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey::new(self.series_id, self.season_number, self.episode_number)
    }
}

/// A user marked an individual episode as watched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletedEpisodeRecord {
    pub user_id: UserId,
    pub key: EpisodeKey,
    pub completed_at: DateTime<Utc>,
}

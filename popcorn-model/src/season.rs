use chrono::NaiveDate;

use crate::episode::Episode;
use crate::ids::{SeasonKey, SeriesId};

/// Season snapshot. `episodes` is empty when the season was embedded in a
/// series payload rather than fetched on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Season {
    pub id: u64,
    pub series_id: SeriesId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overview: String,
    pub season_number: u16,
    pub air_date: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episode_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poster_url: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn key(&self) -> SeasonKey {
        SeasonKey {
            series_id: self.series_id,
            season_number: self.season_number,
        }
    }
}

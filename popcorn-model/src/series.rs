use chrono::NaiveDate;

use crate::episode::Episode;
use crate::ids::SeriesId;
use crate::season::Season;

/// Television series snapshot hydrated from the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TvSeries {
    pub id: SeriesId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overview: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tagline: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poster_url: String,
    pub seasons_count: u32,
    pub episodes_count: u32,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    /// `false` once the series has concluded.
    pub in_production: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: String,
    pub last_episode: Option<Episode>,
    pub next_episode: Option<Episode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub seasons: Vec<Season>,
}

impl TvSeries {
    /// Air date of the next announced episode, if the catalog knows one.
    pub fn next_release_date(&self) -> Option<NaiveDate> {
        self.next_episode
            .as_ref()
            .and_then(|episode| episode.release_date)
    }

    pub fn season(&self, season_number: u16) -> Option<&Season> {
        self.seasons
            .iter()
            .find(|season| season.season_number == season_number)
    }
}

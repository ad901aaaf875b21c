use crate::ids::SeriesId;

/// One page of catalog search results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchTvSeriesResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub results: Vec<SearchTvSeriesResult>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchTvSeriesResult {
    pub id: SeriesId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overview: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poster_url: String,
}

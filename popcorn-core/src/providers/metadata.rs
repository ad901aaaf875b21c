use async_trait::async_trait;
use popcorn_model::{Episode, SearchTvSeriesResponse, Season, SeriesId, TvSeries};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read-only view of the external series catalog.
///
/// Lookups answer `Ok(None)` when the catalog does not know the requested
/// item; transport and API failures surface as [`ProviderError`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchTvSeriesResponse, ProviderError>;

    async fn get_series(
        &self,
        id: SeriesId,
    ) -> Result<Option<TvSeries>, ProviderError>;

    async fn get_season(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Result<Option<Season>, ProviderError>;

    async fn get_episodes(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Result<Option<Vec<Episode>>, ProviderError>;

    async fn get_episode(
        &self,
        series_id: SeriesId,
        season_number: u16,
        episode_number: u16,
    ) -> Result<Option<Episode>, ProviderError>;
}

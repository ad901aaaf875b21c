use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use popcorn_config::TmdbConfig;
use popcorn_model::{
    Episode, SearchTvSeriesResponse, SearchTvSeriesResult, Season, SeriesId,
    TvSeries,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::{MetadataProvider, ProviderError};

const API_VERSION: &str = "3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    W300,
    Original,
}

impl PosterSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosterSize::W300 => "w300",
            PosterSize::Original => "original",
        }
    }
}

/// HTTP client for the TMDB v3 API.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    images_base_url: String,
}

impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("images_base_url", &self.images_base_url)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::with_http_client(http, config)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        config: &TmdbConfig,
    ) -> Result<Self, ProviderError> {
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|e| {
            ProviderError::ApiError(format!(
                "invalid TMDB base url {}: {e}",
                config.base_url
            ))
        })?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            images_base_url: config
                .images_base_url
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(&format!("{API_VERSION}/{path}"))
            .map_err(|e| ProviderError::ApiError(format!("bad path {path}: {e}")))
    }

    /// `Ok(None)` on 404, the catalog's way of saying "unknown id".
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ProviderError> {
        let url = self.endpoint(path)?;
        debug!("TMDB GET /{}/{}", API_VERSION, path);

        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if let Some(outcome) = classify_status(status) {
            return match outcome {
                Err(ProviderError::ApiError(_)) => {
                    let body = response.text().await.unwrap_or_default();
                    warn!("TMDB request /{} failed: {} {}", path, status, body);
                    Err(ProviderError::ApiError(format!("{status}: {body}")))
                }
                other => other.map(|()| None),
            };
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn image_url(&self, size: PosterSize, path: Option<&str>) -> String {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => format!(
                "{}/{}/{}",
                self.images_base_url,
                size.as_str(),
                path.trim_start_matches('/')
            ),
            None => String::new(),
        }
    }

    fn series_from_dto(&self, dto: TmdbSeries) -> TvSeries {
        let id = SeriesId(dto.id);
        TvSeries {
            id,
            name: dto.name,
            overview: dto.overview.unwrap_or_default(),
            tagline: dto.tagline.unwrap_or_default(),
            poster_url: self
                .image_url(PosterSize::Original, dto.poster_path.as_deref()),
            seasons_count: dto.number_of_seasons,
            episodes_count: dto.number_of_episodes,
            first_air_date: parse_date(dto.first_air_date.as_deref()),
            last_air_date: parse_date(dto.last_air_date.as_deref()),
            in_production: dto.in_production,
            status: dto.status.unwrap_or_default(),
            last_episode: dto
                .last_episode_to_air
                .map(|episode| self.episode_from_dto(episode, id)),
            next_episode: dto
                .next_episode_to_air
                .map(|episode| self.episode_from_dto(episode, id)),
            seasons: dto
                .seasons
                .into_iter()
                .map(|season| self.season_from_dto(season, id))
                .collect(),
        }
    }

    fn season_from_dto(&self, dto: TmdbSeason, series_id: SeriesId) -> Season {
        let episodes: Vec<Episode> = dto
            .episodes
            .into_iter()
            .map(|episode| self.episode_from_dto(episode, series_id))
            .collect();

        Season {
            id: dto.id,
            series_id,
            name: dto.name,
            overview: dto.overview.unwrap_or_default(),
            season_number: dto.season_number,
            air_date: parse_date(dto.air_date.as_deref()),
            episode_count: dto
                .episode_count
                .unwrap_or(episodes.len() as u32),
            poster_url: self
                .image_url(PosterSize::Original, dto.poster_path.as_deref()),
            episodes,
        }
    }

    /// `series_id` fills in for payloads that omit `show_id`.
    fn episode_from_dto(
        &self,
        dto: TmdbEpisode,
        series_id: SeriesId,
    ) -> Episode {
        Episode {
            id: dto.id,
            series_id: dto.show_id.map(SeriesId).unwrap_or(series_id),
            season_number: dto.season_number,
            episode_number: dto.episode_number,
            title: dto.name,
            overview: dto.overview.unwrap_or_default(),
            episode_type: dto.episode_type.unwrap_or_default(),
            runtime: dto.runtime,
            release_date: parse_date(dto.air_date.as_deref()),
            still_url: self
                .image_url(PosterSize::Original, dto.still_path.as_deref()),
        }
    }

    fn search_from_dto(&self, dto: TmdbSearchPage) -> SearchTvSeriesResponse {
        SearchTvSeriesResponse {
            results: dto
                .results
                .into_iter()
                .map(|result| SearchTvSeriesResult {
                    id: SeriesId(result.id),
                    name: result.name,
                    overview: result.overview.unwrap_or_default(),
                    poster_url: self.image_url(
                        PosterSize::W300,
                        result.poster_path.as_deref(),
                    ),
                })
                .collect(),
            page: dto.page,
            total_pages: dto.total_pages,
            total_results: dto.total_results,
        }
    }
}

/// `None` for success, `Some(Ok(()))` for "not found", otherwise the error
/// the status maps to.
fn classify_status(
    status: StatusCode,
) -> Option<Result<(), ProviderError>> {
    match status {
        StatusCode::NOT_FOUND => Some(Ok(())),
        StatusCode::UNAUTHORIZED => Some(Err(ProviderError::InvalidApiKey)),
        StatusCode::TOO_MANY_REQUESTS => Some(Err(ProviderError::RateLimited)),
        status if !status.is_success() => {
            Some(Err(ProviderError::ApiError(status.to_string())))
        }
        _ => None,
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchTvSeriesResponse, ProviderError> {
        let page = page.max(1);
        let dto: Option<TmdbSearchPage> = self
            .fetch(
                "search/tv",
                &[("query", query.to_string()), ("page", page.to_string())],
            )
            .await?;

        Ok(match dto {
            Some(dto) => self.search_from_dto(dto),
            None => SearchTvSeriesResponse {
                page,
                ..SearchTvSeriesResponse::default()
            },
        })
    }

    async fn get_series(
        &self,
        id: SeriesId,
    ) -> Result<Option<TvSeries>, ProviderError> {
        let dto: Option<TmdbSeries> = self.fetch(&format!("tv/{id}"), &[]).await?;
        Ok(dto.map(|dto| self.series_from_dto(dto)))
    }

    async fn get_season(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Result<Option<Season>, ProviderError> {
        let dto: Option<TmdbSeason> = self
            .fetch(&format!("tv/{series_id}/season/{season_number}"), &[])
            .await?;
        Ok(dto.map(|dto| self.season_from_dto(dto, series_id)))
    }

    async fn get_episodes(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Result<Option<Vec<Episode>>, ProviderError> {
        Ok(self
            .get_season(series_id, season_number)
            .await?
            .map(|season| season.episodes))
    }

    async fn get_episode(
        &self,
        series_id: SeriesId,
        season_number: u16,
        episode_number: u16,
    ) -> Result<Option<Episode>, ProviderError> {
        let dto: Option<TmdbEpisode> = self
            .fetch(
                &format!(
                    "tv/{series_id}/season/{season_number}/episode/{episode_number}"
                ),
                &[],
            )
            .await?;
        Ok(dto.map(|dto| self.episode_from_dto(dto, series_id)))
    }
}

#[derive(Debug, Deserialize)]
struct TmdbSearchPage {
    #[serde(default)]
    results: Vec<TmdbSearchResult>,
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResult {
    id: u64,
    #[serde(default)]
    name: String,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbSeries {
    id: u64,
    #[serde(default)]
    name: String,
    overview: Option<String>,
    first_air_date: Option<String>,
    last_air_date: Option<String>,
    #[serde(default)]
    number_of_seasons: u32,
    #[serde(default)]
    number_of_episodes: u32,
    #[serde(default)]
    in_production: bool,
    status: Option<String>,
    tagline: Option<String>,
    poster_path: Option<String>,
    last_episode_to_air: Option<TmdbEpisode>,
    next_episode_to_air: Option<TmdbEpisode>,
    #[serde(default)]
    seasons: Vec<TmdbSeason>,
}

/// Season summary inside a series payload, or the full season document
/// (with `episodes`) from the season endpoint.
#[derive(Debug, Deserialize)]
struct TmdbSeason {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    overview: Option<String>,
    #[serde(default)]
    season_number: u16,
    episode_count: Option<u32>,
    air_date: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Deserialize)]
struct TmdbEpisode {
    id: u64,
    show_id: Option<u64>,
    #[serde(default)]
    name: String,
    overview: Option<String>,
    runtime: Option<u32>,
    air_date: Option<String>,
    #[serde(default)]
    season_number: u16,
    #[serde(default)]
    episode_number: u16,
    episode_type: Option<String>,
    still_path: Option<String>,
}

//! Shared fixtures for core integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argon2::Params;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use popcorn_config::{CacheConfig, CacheSettings};
use popcorn_core::cache::{LocalCacheStore, SharedCacheStore};
use popcorn_core::context::{PopcornContext, Repositories};
use popcorn_core::database::{
    InMemoryCompletedEpisodeRepository, InMemoryTrackedSeriesRepository,
    InMemoryUserRepository,
};
use popcorn_core::error::PopcornError;
use popcorn_core::security::Argon2PasswordHasher;
use popcorn_core::model::{
    Episode, SearchTvSeriesResponse, SearchTvSeriesResult, Season, SeriesId,
    TvSeries,
};
use popcorn_core::providers::{MetadataProvider, ProviderError};

/// Catalog double that serves a fixed set of series and counts every
/// request it answers.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    series: Mutex<HashMap<SeriesId, TvSeries>>,
    series_calls: Mutex<HashMap<SeriesId, usize>>,
    search_calls: Mutex<usize>,
    season_calls: Mutex<usize>,
    episode_list_calls: Mutex<usize>,
    fail_with_rate_limit: Mutex<bool>,
}

impl FakeCatalog {
    pub fn with_series(series: impl IntoIterator<Item = TvSeries>) -> Self {
        let catalog = Self::default();
        {
            let mut guard = catalog.series.lock().unwrap();
            for item in series {
                guard.insert(item.id, item);
            }
        }
        catalog
    }

    pub fn series_calls(&self, id: SeriesId) -> usize {
        self.series_calls
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_series_calls(&self) -> usize {
        self.series_calls.lock().unwrap().values().sum()
    }

    pub fn search_calls(&self) -> usize {
        *self.search_calls.lock().unwrap()
    }

    pub fn season_calls(&self) -> usize {
        *self.season_calls.lock().unwrap()
    }

    pub fn episode_list_calls(&self) -> usize {
        *self.episode_list_calls.lock().unwrap()
    }

    pub fn fail_with_rate_limit(&self) {
        *self.fail_with_rate_limit.lock().unwrap() = true;
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if *self.fail_with_rate_limit.lock().unwrap() {
            return Err(ProviderError::RateLimited);
        }
        Ok(())
    }

    fn lookup(&self, id: SeriesId) -> Option<TvSeries> {
        self.series.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl MetadataProvider for FakeCatalog {
    async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchTvSeriesResponse, ProviderError> {
        self.check_available()?;
        *self.search_calls.lock().unwrap() += 1;

        let needle = query.to_lowercase();
        let mut results: Vec<SearchTvSeriesResult> = self
            .series
            .lock()
            .unwrap()
            .values()
            .filter(|series| series.name.to_lowercase().contains(&needle))
            .map(|series| SearchTvSeriesResult {
                id: series.id,
                name: series.name.clone(),
                ..Default::default()
            })
            .collect();
        results.sort_by_key(|result| result.id);

        let total = results.len() as u32;
        Ok(SearchTvSeriesResponse {
            results,
            page,
            total_pages: 1,
            total_results: total,
        })
    }

    async fn get_series(
        &self,
        id: SeriesId,
    ) -> Result<Option<TvSeries>, ProviderError> {
        self.check_available()?;
        *self.series_calls.lock().unwrap().entry(id).or_default() += 1;
        Ok(self.lookup(id))
    }

    async fn get_season(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Result<Option<Season>, ProviderError> {
        self.check_available()?;
        *self.season_calls.lock().unwrap() += 1;
        Ok(self
            .lookup(series_id)
            .and_then(|series| series.season(season_number).cloned()))
    }

    async fn get_episodes(
        &self,
        series_id: SeriesId,
        season_number: u16,
    ) -> Result<Option<Vec<Episode>>, ProviderError> {
        self.check_available()?;
        *self.episode_list_calls.lock().unwrap() += 1;
        Ok(self
            .lookup(series_id)
            .and_then(|series| series.season(season_number).cloned())
            .map(|season| season.episodes))
    }

    async fn get_episode(
        &self,
        series_id: SeriesId,
        season_number: u16,
        episode_number: u16,
    ) -> Result<Option<Episode>, ProviderError> {
        let episodes = self.get_episodes(series_id, season_number).await?;
        Ok(episodes.and_then(|episodes| {
            episodes
                .into_iter()
                .find(|episode| episode.episode_number == episode_number)
        }))
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn episode(series_id: u64, season: u16, number: u16) -> Episode {
    Episode {
        id: series_id * 10_000 + u64::from(season) * 100 + u64::from(number),
        series_id: SeriesId(series_id),
        season_number: season,
        episode_number: number,
        title: format!("Episode {number}"),
        release_date: Some(date(2020, 1, number as u32)),
        ..Default::default()
    }
}

pub fn season(series_id: u64, number: u16, episodes: u16) -> Season {
    Season {
        id: series_id * 100 + u64::from(number),
        series_id: SeriesId(series_id),
        name: format!("Season {number}"),
        season_number: number,
        episode_count: u32::from(episodes),
        episodes: (1..=episodes)
            .map(|n| episode(series_id, number, n))
            .collect(),
        ..Default::default()
    }
}

/// Ended series with two seasons of three episodes.
pub fn concluded_series(id: u64, name: &str) -> TvSeries {
    TvSeries {
        id: SeriesId(id),
        name: name.to_string(),
        seasons_count: 2,
        episodes_count: 6,
        first_air_date: Some(date(2015, 3, 1)),
        last_air_date: Some(date(2017, 5, 1)),
        in_production: false,
        status: "Ended".to_string(),
        seasons: vec![season(id, 1, 3), season(id, 2, 3)],
        ..Default::default()
    }
}

/// Running series whose next episode airs `days_ahead` days from today.
pub fn airing_series(id: u64, name: &str, days_ahead: i64) -> TvSeries {
    let mut next = episode(id, 1, 4);
    next.release_date =
        Some(Utc::now().date_naive() + chrono::Duration::days(days_ahead));
    TvSeries {
        id: SeriesId(id),
        name: name.to_string(),
        seasons_count: 1,
        episodes_count: 4,
        in_production: true,
        status: "Returning Series".to_string(),
        next_episode: Some(next),
        seasons: vec![season(id, 1, 3)],
        ..Default::default()
    }
}

pub fn cache_config() -> CacheConfig {
    CacheConfig {
        search: CacheSettings::new(16, Duration::from_secs(3600)),
        shared_store: CacheSettings::new(64, Duration::from_secs(24 * 3600)),
    }
}

type StoreResult<T> = popcorn_core::Result<T>;

/// Shared store whose backend is unreachable: every call fails.
#[derive(Debug, Default)]
pub struct FailingStore {
    calls: Mutex<usize>,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn fail<T>(&self) -> StoreResult<T> {
        *self.calls.lock().unwrap() += 1;
        Err(PopcornError::Store("connection refused".to_string()))
    }
}

#[async_trait]
impl SharedCacheStore for FailingStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        self.fail()
    }

    async fn get_many(&self, _keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        self.fail()
    }

    async fn set(
        &self,
        _key: &str,
        _value: String,
        _ttl: Duration,
    ) -> StoreResult<bool> {
        self.fail()
    }

    async fn ttl(&self, _key: &str) -> StoreResult<Option<Duration>> {
        self.fail()
    }
}

/// Argon2id with minimal cost so account tests stay fast.
pub fn fast_hasher() -> Arc<Argon2PasswordHasher> {
    Arc::new(Argon2PasswordHasher::with_params(
        Params::new(8, 1, 1, None).expect("argon2 params"),
    ))
}

/// Fully wired in-process context with handles on its collaborators.
#[derive(Debug)]
pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub store: Arc<LocalCacheStore>,
    pub tracked: Arc<InMemoryTrackedSeriesRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub context: PopcornContext,
}

impl Harness {
    pub fn empty() -> Self {
        Self::new(Vec::<TvSeries>::new())
    }

    pub fn new(series: impl IntoIterator<Item = TvSeries>) -> Self {
        let catalog = Arc::new(FakeCatalog::with_series(series));
        let config = cache_config();
        let store = Arc::new(
            LocalCacheStore::new(
                config.shared_store.capacity,
                config.shared_store.ttl,
            )
            .expect("store"),
        );
        let tracked = Arc::new(InMemoryTrackedSeriesRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());

        let provider: Arc<dyn MetadataProvider> = catalog.clone();
        let shared: Arc<dyn SharedCacheStore> = store.clone();
        let repositories = Repositories {
            tracked: tracked.clone(),
            completed: Arc::new(InMemoryCompletedEpisodeRepository::new()),
            users: users.clone(),
        };
        let context = PopcornContext::new(provider, shared, repositories, &config)
            .expect("context")
            .with_password_hasher(fast_hasher());

        Self {
            catalog,
            store,
            tracked,
            users,
            context,
        }
    }

    /// Context over `catalog` whose shared store is down.
    pub fn with_failing_store(
        series: impl IntoIterator<Item = TvSeries>,
    ) -> (Arc<FakeCatalog>, Arc<FailingStore>, PopcornContext) {
        let catalog = Arc::new(FakeCatalog::with_series(series));
        let store = Arc::new(FailingStore::default());
        let provider: Arc<dyn MetadataProvider> = catalog.clone();
        let shared: Arc<dyn SharedCacheStore> = store.clone();
        let context = PopcornContext::new(
            provider,
            shared,
            Repositories::in_memory(),
            &cache_config(),
        )
        .expect("context");
        (catalog, store, context)
    }
}

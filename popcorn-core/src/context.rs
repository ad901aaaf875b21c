use std::fmt;
use std::sync::Arc;

use popcorn_config::{CacheConfig, Config};
use popcorn_model::SearchTvSeriesResponse;
use tracing::info;

use crate::cache::{
    EpisodesCache, LocalCacheStore, SeriesCache, SharedCacheStore,
    SharedEpisodesCache, SharedSeriesCache, TtlCacheService,
};
use crate::database::{
    CompletedEpisodeRepository, InMemoryCompletedEpisodeRepository,
    InMemoryTrackedSeriesRepository, InMemoryUserRepository,
    TrackedSeriesRepository, UserRepository,
};
use crate::error::Result;
use crate::providers::{MetadataProvider, TmdbClient};
use crate::security::{Argon2PasswordHasher, PasswordHasher};
use crate::services::series::SearchCache;
use crate::services::{
    EpisodeService, SeasonService, SeriesService, TrackedSeriesService,
    UserService,
};

/// Persistence ports a context hands to its services.
#[derive(Clone)]
pub struct Repositories {
    pub tracked: Arc<dyn TrackedSeriesRepository>,
    pub completed: Arc<dyn CompletedEpisodeRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl fmt::Debug for Repositories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

impl Repositories {
    /// Process-local repositories; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            tracked: Arc::new(InMemoryTrackedSeriesRepository::new()),
            completed: Arc::new(InMemoryCompletedEpisodeRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

/// Long-lived collaborators and cache instances, built once at start-up
/// and shared by every service handed out.
#[derive(Clone)]
pub struct PopcornContext {
    provider: Arc<dyn MetadataProvider>,
    store: Arc<dyn SharedCacheStore>,
    series_cache: Arc<dyn SeriesCache>,
    episodes_cache: Arc<dyn EpisodesCache>,
    search_cache: Arc<SearchCache>,
    repositories: Repositories,
    hasher: Arc<dyn PasswordHasher>,
}

impl fmt::Debug for PopcornContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopcornContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl PopcornContext {
    /// Wires TMDB, Redis (when configured, else the in-process store) and
    /// Postgres (when configured, else in-memory repositories).
    pub async fn from_config(config: &Config) -> Result<Self> {
        let provider: Arc<dyn MetadataProvider> =
            Arc::new(TmdbClient::new(&config.tmdb)?);
        let store = Self::shared_store(config).await?;
        let repositories = Self::repositories(config).await?;

        Self::new(provider, store, repositories, &config.cache)
    }

    /// Passwords are hashed with default Argon2id parameters; see
    /// [`with_password_hasher`](Self::with_password_hasher).
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn SharedCacheStore>,
        repositories: Repositories,
        cache: &CacheConfig,
    ) -> Result<Self> {
        let search_cache: Arc<SearchCache> =
            Arc::new(TtlCacheService::<String, SearchTvSeriesResponse>::with_ttl(
                cache.search.capacity,
                cache.search.ttl,
            )?);

        Ok(Self {
            provider,
            series_cache: Arc::new(SharedSeriesCache::new(store.clone())),
            episodes_cache: Arc::new(SharedEpisodesCache::new(store.clone())),
            store,
            search_cache,
            repositories,
            hasher: Arc::new(Argon2PasswordHasher::new()?),
        })
    }

    pub fn with_password_hasher(
        mut self,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        self.hasher = hasher;
        self
    }

    /// Context backed entirely by in-process stores.
    pub fn in_memory(
        provider: Arc<dyn MetadataProvider>,
        cache: &CacheConfig,
    ) -> Result<Self> {
        let store = Arc::new(LocalCacheStore::new(
            cache.shared_store.capacity,
            cache.shared_store.ttl,
        )?);
        Self::new(provider, store, Repositories::in_memory(), cache)
    }

    #[cfg(feature = "redis")]
    async fn shared_store(config: &Config) -> Result<Arc<dyn SharedCacheStore>> {
        if let Some(redis) = &config.redis {
            let store = crate::cache::RedisCacheStore::new(&redis.url).await?;
            return Ok(Arc::new(store));
        }
        Self::local_store(&config.cache)
    }

    #[cfg(not(feature = "redis"))]
    async fn shared_store(config: &Config) -> Result<Arc<dyn SharedCacheStore>> {
        if config.redis.is_some() {
            tracing::warn!("Redis configured but the redis feature is disabled");
        }
        Self::local_store(&config.cache)
    }

    fn local_store(cache: &CacheConfig) -> Result<Arc<dyn SharedCacheStore>> {
        info!(
            "Using in-process cache store (capacity {})",
            cache.shared_store.capacity
        );
        Ok(Arc::new(LocalCacheStore::new(
            cache.shared_store.capacity,
            cache.shared_store.ttl,
        )?))
    }

    #[cfg(feature = "database")]
    async fn repositories(config: &Config) -> Result<Repositories> {
        use crate::database::{
            PostgresCompletedEpisodeRepository, PostgresTrackedSeriesRepository,
            PostgresUserRepository,
        };

        let Some(url) = &config.database.url else {
            return Ok(Self::memory_repositories());
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        info!("Connected to Postgres for tracked series and accounts");
        Ok(Repositories {
            tracked: Arc::new(PostgresTrackedSeriesRepository::new(
                pool.clone(),
            )),
            completed: Arc::new(PostgresCompletedEpisodeRepository::new(
                pool.clone(),
            )),
            users: Arc::new(PostgresUserRepository::new(pool)),
        })
    }

    #[cfg(not(feature = "database"))]
    async fn repositories(config: &Config) -> Result<Repositories> {
        if config.database.url.is_some() {
            tracing::warn!(
                "DATABASE_URL set but the database feature is disabled"
            );
        }
        Ok(Self::memory_repositories())
    }

    fn memory_repositories() -> Repositories {
        info!("Using in-memory repositories; tracking state is not durable");
        Repositories::in_memory()
    }

    pub fn store(&self) -> &Arc<dyn SharedCacheStore> {
        &self.store
    }

    pub fn series(&self) -> SeriesService {
        SeriesService::new(
            self.provider.clone(),
            self.series_cache.clone(),
            self.search_cache.clone(),
        )
    }

    pub fn seasons(&self) -> SeasonService {
        SeasonService::new(self.provider.clone(), self.series_cache.clone())
    }

    pub fn episodes(&self) -> EpisodeService {
        EpisodeService::new(
            self.provider.clone(),
            self.episodes_cache.clone(),
            self.repositories.completed.clone(),
        )
    }

    pub fn tracking(&self) -> TrackedSeriesService {
        TrackedSeriesService::new(
            self.repositories.tracked.clone(),
            self.series(),
        )
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.repositories.users.clone(), self.hasher.clone())
    }
}

use std::fmt;
use std::time::Duration;

const DAY: u64 = 24 * 60 * 60;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org";
pub const DEFAULT_TMDB_IMAGES_BASE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub cache: CacheConfig,
    pub tmdb: TmdbConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
}

/// Capacity and entry lifetime of one logical cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub capacity: usize,
    pub ttl: Duration,
}

impl CacheSettings {
    pub const fn new(capacity: usize, ttl: Duration) -> Self {
        Self { capacity, ttl }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Search result pages by query and page.
    pub search: CacheSettings,
    /// In-process stand-in for Redis when none is configured. Holds the
    /// series and episode-list entries; `ttl` bounds entries written
    /// without an explicit lifetime.
    pub shared_store: CacheSettings,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search: CacheSettings::new(128, Duration::from_secs(DAY)),
            shared_store: CacheSettings::new(
                1024,
                Duration::from_secs(14 * DAY),
            ),
        }
    }
}

impl CacheConfig {
    /// Settings by the name used in config files and env variables.
    pub fn named_mut(&mut self, name: &str) -> Option<&mut CacheSettings> {
        match name {
            "search" => Some(&mut self.search),
            "shared_store" => Some(&mut self.shared_store),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CacheSettings)> {
        [
            ("search", &self.search),
            ("shared_store", &self.shared_store),
        ]
        .into_iter()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub images_base_url: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            api_key: String::new(),
            images_base_url: DEFAULT_TMDB_IMAGES_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("images_base_url", &self.images_base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: String,
}

pub mod error;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{CacheSettings, Config, RedisConfig};
use crate::validation;
use error::ConfigLoadError;

pub const CONFIG_PATH_ENV: &str = "POPCORN_CONFIG_PATH";

const DEFAULT_CONFIG_FILES: &[&str] = &["popcorn.toml", "config/popcorn.toml"];
const CACHE_NAMES: &[&str] = &["search", "shared_store"];

/// Where the file layer of a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Defaults,
    EnvPath(PathBuf),
    File(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Defaults => None,
            ConfigSource::EnvPath(path) | ConfigSource::File(path) => Some(path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub source: ConfigSource,
    pub env_file_loaded: bool,
}

/// Builds a [`Config`] from defaults, a TOML file and the environment.
///
/// Evaluation order, later layers winning:
/// 1) built-in defaults,
/// 2) `$POPCORN_CONFIG_PATH`, or the first of `popcorn.toml` and
///    `config/popcorn.toml` found under the base directory,
/// 3) environment variables (`TMDB_API_KEY`, `DATABASE_URL`,
///    `CACHE_SEARCH_CAPACITY`, `CACHE_SHARED_STORE_TTL`, ...).
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    base_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    skip_dotenv: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the default config file names are resolved against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Explicit config file; takes precedence over `$POPCORN_CONFIG_PATH`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn without_dotenv(mut self) -> Self {
        self.skip_dotenv = true;
        self
    }

    /// Loads against the process environment, seeding it from `.env`
    /// first unless disabled.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let mut load = self.load_with_env(|key| std::env::var(key).ok())?;
        load.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Like [`load`](Self::load) but reads variables through `env`.
    pub fn load_with_env<F>(&self, env: F) -> Result<ConfigLoad, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();

        let source = self.resolve_file(&env);
        if let Some(path) = source.path() {
            debug!("Loading configuration file {}", path.display());
            read_file(path)?.apply(&mut config)?;
        }

        apply_env(&mut config, &env)?;
        validation::validate(&config)?;

        info!("Configuration loaded from {:?}", source);
        Ok(ConfigLoad {
            config,
            source,
            env_file_loaded: false,
        })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if let Some(path) = &self.env_file {
            dotenvy::from_path(path)?;
            return Ok(true);
        }
        if self.skip_dotenv {
            return Ok(false);
        }
        match dotenvy::dotenv() {
            Ok(path) => {
                debug!("Loaded environment from {}", path.display());
                Ok(true)
            }
            Err(err) if err.not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn resolve_file<F>(&self, env: &F) -> ConfigSource
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            return ConfigSource::File(path.clone());
        }
        if let Some(path) = env(CONFIG_PATH_ENV) {
            return ConfigSource::EnvPath(PathBuf::from(path));
        }

        let base = self.base_dir.as_deref().unwrap_or_else(|| Path::new("."));
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| base.join(name))
            .find(|candidate| candidate.is_file())
            .map_or(ConfigSource::Defaults, ConfigSource::File)
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_ttl(key: &str, value: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(value.trim()).map_err(|source| {
        ConfigLoadError::InvalidDuration {
            key: key.to_string(),
            value: value.to_string(),
            source,
        }
    })
}

fn parse_capacity(key: &str, value: &str) -> Result<usize, ConfigLoadError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigLoadError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn apply_env<F>(config: &mut Config, env: &F) -> Result<(), ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env("TMDB_API_KEY") {
        config.tmdb.api_key = value;
    }
    if let Some(value) = env("TMDB_BASE_URL") {
        config.tmdb.base_url = value;
    }
    if let Some(value) = env("TMDB_IMAGES_BASE_URL") {
        config.tmdb.images_base_url = value;
    }
    if let Some(value) = env("DATABASE_URL") {
        config.database.url = Some(value);
    }
    if let Some(value) = env("REDIS_URL") {
        config.redis = Some(RedisConfig { url: value });
    }

    for name in CACHE_NAMES {
        let prefix = format!("CACHE_{}", name.to_ascii_uppercase());
        let Some(settings) = config.cache.named_mut(name) else {
            continue;
        };

        let capacity_key = format!("{prefix}_CAPACITY");
        if let Some(value) = env(&capacity_key) {
            settings.capacity = parse_capacity(&capacity_key, &value)?;
        }
        let ttl_key = format!("{prefix}_TTL");
        if let Some(value) = env(&ttl_key) {
            settings.ttl = parse_ttl(&ttl_key, &value)?;
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    cache: BTreeMap<String, FileCacheSettings>,
    tmdb: FileTmdbConfig,
    database: FileDatabaseConfig,
    redis: Option<FileRedisConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileCacheSettings {
    capacity: Option<usize>,
    ttl: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileTmdbConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    images_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileDatabaseConfig {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileRedisConfig {
    url: String,
}

impl FileConfig {
    fn apply(self, config: &mut Config) -> Result<(), ConfigLoadError> {
        for (name, file) in self.cache {
            let Some(settings) = config.cache.named_mut(&name) else {
                return Err(ConfigLoadError::Validation(vec![format!(
                    "unknown cache '{name}' (expected one of {})",
                    CACHE_NAMES.join(", ")
                )]));
            };
            apply_cache_settings(&name, file, settings)?;
        }

        if let Some(value) = self.tmdb.base_url {
            config.tmdb.base_url = value;
        }
        if let Some(value) = self.tmdb.api_key {
            config.tmdb.api_key = value;
        }
        if let Some(value) = self.tmdb.images_base_url {
            config.tmdb.images_base_url = value;
        }
        if self.database.url.is_some() {
            config.database.url = self.database.url;
        }
        if let Some(redis) = self.redis {
            config.redis = Some(RedisConfig { url: redis.url });
        }
        Ok(())
    }
}

fn apply_cache_settings(
    name: &str,
    file: FileCacheSettings,
    settings: &mut CacheSettings,
) -> Result<(), ConfigLoadError> {
    if let Some(capacity) = file.capacity {
        settings.capacity = capacity;
    }
    if let Some(ttl) = file.ttl {
        settings.ttl = parse_ttl(&format!("cache.{name}.ttl"), &ttl)?;
    }
    Ok(())
}

//! Configuration for Popcorn.
//!
//! Settings come from built-in defaults, an optional TOML file and
//! environment variables (optionally seeded from a `.env` file), in that
//! order of increasing precedence. [`ConfigLoader`] performs the merge and
//! validation; [`telemetry::init_tracing`] installs the log subscriber.
#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod telemetry;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigSource, error::ConfigLoadError};
pub use models::{
    CacheConfig, CacheSettings, Config, DatabaseConfig, RedisConfig,
    TmdbConfig,
};

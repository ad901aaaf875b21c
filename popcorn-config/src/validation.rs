use url::Url;

use crate::loader::error::ConfigLoadError;
use crate::models::Config;

/// Checks invariants the loader cannot express through types. Reports
/// every violation at once.
pub fn validate(config: &Config) -> Result<(), ConfigLoadError> {
    let mut problems = Vec::new();

    for (name, settings) in config.cache.iter() {
        if settings.capacity == 0 {
            problems.push(format!("cache.{name}.capacity must be positive"));
        }
        if settings.ttl.is_zero() {
            problems.push(format!("cache.{name}.ttl must be positive"));
        }
    }

    if config.tmdb.api_key.trim().is_empty() {
        problems.push("tmdb.api_key is required (set TMDB_API_KEY)".into());
    }
    for (key, value) in [
        ("tmdb.base_url", &config.tmdb.base_url),
        ("tmdb.images_base_url", &config.tmdb.images_base_url),
    ] {
        if let Err(err) = Url::parse(value) {
            problems.push(format!("{key} '{value}' is not a valid url: {err}"));
        }
    }

    if let Some(redis) = &config.redis
        && Url::parse(&redis.url).is_err()
    {
        problems.push(format!("redis.url '{}' is not a valid url", redis.url));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigLoadError::Validation(problems))
    }
}

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use popcorn_config::{ConfigLoadError, ConfigLoader, ConfigSource};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

const SAMPLE: &str = r#"
[cache.search]
capacity = 32
ttl = "6h"

[cache.shared_store]
ttl = "2days"

[tmdb]
api_key = "from-file"
base_url = "http://localhost:9000"

[database]
url = "postgres://popcorn@localhost/popcorn"

[redis]
url = "redis://127.0.0.1:6379"
"#;

#[test]
fn reads_default_file_from_base_dir() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("config"))?;
    let path = dir.path().join("config/popcorn.toml");
    fs::write(&path, SAMPLE)?;

    let load = ConfigLoader::new()
        .with_base_dir(dir.path())
        .load_with_env(env(&[]))?;

    assert_eq!(load.source, ConfigSource::File(path));
    let config = load.config;
    assert_eq!(config.cache.search.capacity, 32);
    assert_eq!(config.cache.search.ttl, Duration::from_secs(6 * 3600));
    assert_eq!(config.cache.shared_store.capacity, 1024);
    assert_eq!(
        config.cache.shared_store.ttl,
        Duration::from_secs(2 * 24 * 3600)
    );
    assert_eq!(config.tmdb.api_key, "from-file");
    assert_eq!(config.tmdb.images_base_url, "https://image.tmdb.org/t/p");
    assert_eq!(
        config.database.url.as_deref(),
        Some("postgres://popcorn@localhost/popcorn")
    );
    assert_eq!(
        config.redis.map(|redis| redis.url).as_deref(),
        Some("redis://127.0.0.1:6379")
    );
    Ok(())
}

#[test]
fn env_path_wins_over_default_files_and_env_wins_over_file()
-> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("popcorn.toml"), "[tmdb]\napi_key = \"default\"\n")?;
    let custom = dir.path().join("custom.toml");
    fs::write(&custom, SAMPLE)?;
    let custom_str = custom.to_string_lossy().into_owned();

    let load = ConfigLoader::new()
        .with_base_dir(dir.path())
        .load_with_env(env(&[
            ("POPCORN_CONFIG_PATH", custom_str.as_str()),
            ("TMDB_API_KEY", "from-env"),
            ("CACHE_SEARCH_CAPACITY", "8"),
        ]))?;

    assert_eq!(load.source, ConfigSource::EnvPath(custom));
    assert_eq!(load.config.tmdb.api_key, "from-env");
    assert_eq!(load.config.cache.search.capacity, 8);
    assert_eq!(load.config.cache.search.ttl, Duration::from_secs(6 * 3600));
    Ok(())
}

#[test]
fn defaults_match_documented_cache_sizes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let load = ConfigLoader::new()
        .with_base_dir(dir.path())
        .load_with_env(env(&[("TMDB_API_KEY", "k")]))?;

    let cache = load.config.cache;
    let day = Duration::from_secs(24 * 3600);
    assert_eq!((cache.search.capacity, cache.search.ttl), (128, day));
    assert_eq!(
        (cache.shared_store.capacity, cache.shared_store.ttl),
        (1024, 14 * day)
    );
    assert!(load.config.redis.is_none());
    Ok(())
}

#[test]
fn zero_capacity_in_file_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("popcorn.toml");
    fs::write(&path, "[cache.search]\ncapacity = 0\n[tmdb]\napi_key = \"k\"\n")?;

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env(&[]))
        .unwrap_err();

    match err {
        ConfigLoadError::Validation(problems) => {
            assert_eq!(problems, vec!["cache.search.capacity must be positive"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn unknown_cache_section_is_reported() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("popcorn.toml");
    fs::write(&path, "[cache.movies]\ncapacity = 4\n")?;

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env(&[("TMDB_API_KEY", "k")]))
        .unwrap_err();
    assert!(err.to_string().contains("unknown cache 'movies'"));
    Ok(())
}

#[test]
fn malformed_toml_names_the_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("popcorn.toml");
    fs::write(&path, "[tmdb\napi_key = ")?;

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env(&[]))
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
    assert!(err.to_string().contains("popcorn.toml"));
    Ok(())
}

#[test]
fn env_file_seeds_process_environment() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "POPCORN_TEST_ONLY_TMDB_KEY=seeded\n")?;

    let load = ConfigLoader::new()
        .with_base_dir(dir.path())
        .with_env_file(&env_file)
        .with_config_path({
            let path = dir.path().join("popcorn.toml");
            fs::write(&path, "[tmdb]\napi_key = \"file\"\n")?;
            path
        })
        .load()?;

    assert!(load.env_file_loaded);
    assert_eq!(
        std::env::var("POPCORN_TEST_ONLY_TMDB_KEY").as_deref(),
        Ok("seeded")
    );
    Ok(())
}

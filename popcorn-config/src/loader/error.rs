use std::path::PathBuf;

/// Failures while assembling a [`Config`](crate::Config).
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("invalid duration '{value}' for {key}: {source}")]
    InvalidDuration {
        key: String,
        value: String,
        source: humantime::DurationError,
    },

    #[error("invalid number '{value}' for {key}")]
    InvalidNumber { key: String, value: String },

    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}

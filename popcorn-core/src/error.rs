use popcorn_model::{SeriesId, TrackedSeriesState, User};
use thiserror::Error;

use crate::cache::CacheError;
use crate::providers::ProviderError;

/// Rejected tracked-series transitions. Each variant carries a stable code
/// that request layers can surface verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("series {series_id} was not started")]
    NotStarted { series_id: SeriesId },

    #[error("series {series_id} was not stopped")]
    NotStopped { series_id: SeriesId },

    #[error("{state} is not a valid target for this operation")]
    InvalidTarget { state: TrackedSeriesState },
}

impl TransitionError {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::NotStarted { .. } => "series.not_started",
            TransitionError::NotStopped { .. } => "series.not_stopped",
            TransitionError::InvalidTarget { .. } => "series.invalid_state",
        }
    }
}

/// Rejected account operations, each with a stable code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("The user does not exist.")]
    NotFound,

    #[error("Username is required.")]
    EmptyUsername,

    #[error(
        "Username must be between {min} and {max} characters long.",
        min = User::USERNAME_MIN_LENGTH,
        max = User::USERNAME_MAX_LENGTH
    )]
    InvalidUsernameLength,

    #[error(
        "Username may only include letters, numbers, dots (.), underscores (_) and hyphens (-)."
    )]
    BadUsernameFormat,

    #[error("The username already exists.")]
    UsernameAlreadyExists,

    #[error("Email is required.")]
    EmptyEmail,

    #[error("The provided email is not a valid email address.")]
    BadEmailFormat,

    #[error("The email already exists.")]
    EmailAlreadyExists,

    #[error(
        "The password must be between 8-20 characters long and contain one uppercase letter, one lowercase letter and one number."
    )]
    WeakPassword,

    #[error("Wrong password.")]
    WrongPassword,
}

impl UserError {
    pub fn code(&self) -> &'static str {
        match self {
            UserError::NotFound => "user.not_exists",
            UserError::EmptyUsername => "user.username.empty",
            UserError::InvalidUsernameLength => "user.username.invalid_length",
            UserError::BadUsernameFormat => "user.username.bad_format",
            UserError::UsernameAlreadyExists => "user.username.already_exists",
            UserError::EmptyEmail => "user.email.empty",
            UserError::BadEmailFormat => "user.email.bad_format",
            UserError::EmailAlreadyExists => "user.email.already_exists",
            UserError::WeakPassword => "user.password.weak",
            UserError::WrongPassword => "user.password.wrong",
        }
    }
}

#[derive(Error, Debug)]
pub enum PopcornError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Metadata provider error: {0}")]
    Provider(#[from] ProviderError),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PopcornError {
    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            PopcornError::Transition(err) => err.code(),
            PopcornError::User(err) => err.code(),
            PopcornError::PasswordHash(_) => "security.password_hash",
            PopcornError::Cache(_) => "cache.invalid_configuration",
            PopcornError::Provider(_) => "metadata.unavailable",
            #[cfg(feature = "database")]
            PopcornError::Database(_) => "persistence.failure",
            PopcornError::Store(_) => "cache.store_failure",
            PopcornError::Serialization(_) => "serialization.failure",
            PopcornError::Cancelled(_) => "operation.cancelled",
            PopcornError::Internal(_) => "server_error",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PopcornError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, PopcornError>;

//! # Popcorn Core
//!
//! Caching and tracking engine of the Popcorn TV-series tracker.
//!
//! ## Layers
//!
//! - [`cache`]: the capacity and TTL bounded LRU, the typed cache-service
//!   facade, the shared cache store (Redis or in-process) and the
//!   read-through series / episode caches with their TTL policy.
//! - [`services`]: series search and lookup, seasons, episodes and the
//!   tracked-series state machine
//!   ([`TrackedSeriesService`](services::TrackedSeriesService)).
//! - [`database`]: repository ports for tracked series, completed
//!   episodes and user accounts, with in-memory and PostgreSQL adapters.
//! - [`providers`]: the metadata catalog port and its TMDB client.
//! - [`security`]: the password hashing port and its Argon2id adapter,
//!   used by [`UserService`](services::UserService).
//! - [`context`]: wires long-lived instances from a
//!   [`popcorn_config::Config`].
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL repositories (SQLx) and [`MIGRATOR`]
//! - `redis`: Redis-backed shared cache store
//!
//! ## Example
//!
//! ```no_run
//! use popcorn_config::ConfigLoader;
//! use popcorn_core::context::PopcornContext;
//! use popcorn_core::model::{SeriesId, TrackedSeriesState, UserId};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn start_watching() -> Result<(), Box<dyn std::error::Error>> {
//!     let load = ConfigLoader::new().load()?;
//!     let context = PopcornContext::from_config(&load.config).await?;
//!     let cancel = CancellationToken::new();
//!
//!     let user = UserId::new();
//!     context
//!         .tracking()
//!         .track(user, SeriesId(1396), TrackedSeriesState::Watching, &cancel)
//!         .await?;
//!     let watching = context
//!         .tracking()
//!         .get_tracked(user, TrackedSeriesState::Watching, &cancel)
//!         .await?;
//!     println!("watching {} series", watching.len());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Cache layers shielding the catalog and the data store
pub mod cache;

/// Start-up wiring of caches, repositories and services
pub mod context;

/// Tracked-series and completed-episode persistence
pub mod database;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Error types and error handling utilities
pub mod error;

/// External metadata providers (TMDB integration)
pub mod providers;

/// Password hashing
pub mod security;

/// Use-case services
pub mod services;

pub use popcorn_model as model;

pub use context::{PopcornContext, Repositories};
pub use error::{PopcornError, Result, TransitionError, UserError};

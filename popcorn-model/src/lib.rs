//! Core data model definitions shared across Popcorn crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod episode;
pub mod error;
pub mod ids;
pub mod search;
pub mod season;
pub mod series;
pub mod tracking;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use episode::{CompletedEpisodeRecord, Episode};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{EpisodeKey, SeasonKey, SeriesId, UserId};
pub use search::{SearchTvSeriesResponse, SearchTvSeriesResult};
pub use season::Season;
pub use series::TvSeries;
pub use tracking::{TrackedSeriesState, TrackingRecord};
pub use user::User;

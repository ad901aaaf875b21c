//! Metadata catalog access.

pub mod metadata;
pub mod tmdb;

pub use metadata::{MetadataProvider, ProviderError};
pub use tmdb::{PosterSize, TmdbClient};

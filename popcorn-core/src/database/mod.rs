//! Durable membership of series and episodes in a user's lists, and the
//! accounts owning them.

#[cfg(feature = "database")]
pub mod infrastructure;
pub mod memory;
pub mod ports;

#[cfg(feature = "database")]
pub use infrastructure::postgres::repositories::{
    PostgresCompletedEpisodeRepository, PostgresTrackedSeriesRepository,
    PostgresUserRepository,
};
pub use memory::{
    InMemoryCompletedEpisodeRepository, InMemoryTrackedSeriesRepository,
    InMemoryUserRepository,
};
pub use ports::{
    CompletedEpisodeRepository, TrackedSeriesRepository, UserRepository,
};

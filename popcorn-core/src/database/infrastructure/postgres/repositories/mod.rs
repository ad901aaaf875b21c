pub mod completed_episodes;
pub mod tracked_series;
pub mod users;

pub use completed_episodes::PostgresCompletedEpisodeRepository;
pub use tracked_series::PostgresTrackedSeriesRepository;
pub use users::PostgresUserRepository;

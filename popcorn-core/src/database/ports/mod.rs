pub mod completed_episodes;
pub mod tracked_series;
pub mod users;

pub use completed_episodes::CompletedEpisodeRepository;
pub use tracked_series::TrackedSeriesRepository;
pub use users::UserRepository;

//! Use-case services composed from the caches, the metadata provider and
//! the repositories. Every I/O-bound operation takes a
//! [`CancellationToken`](tokio_util::sync::CancellationToken).

mod cancel;
pub mod episodes;
pub mod seasons;
pub mod series;
pub mod tracking;
pub mod users;

pub use episodes::EpisodeService;
pub use seasons::SeasonService;
pub use series::SeriesService;
pub use tracking::TrackedSeriesService;
pub use users::UserService;

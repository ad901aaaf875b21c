use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "popcorn_core=info,popcorn_config=info";

/// Installs the global subscriber: `RUST_LOG` when set, otherwise
/// [`DEFAULT_LOG_FILTER`]. Returns `false` if a subscriber already exists.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_LOG_FILTER)
}

pub fn init_tracing_with(default_directives: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

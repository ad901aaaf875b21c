//! Write-through TTL policy for the domain caches.
//!
//! Concluded series barely change and are kept for two weeks. Series still
//! in production are refreshed more often the closer their next episode is,
//! so new episode data shows up soon after it airs.

use std::time::Duration;

use chrono::NaiveDate;
use popcorn_model::TvSeries;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

pub const CONCLUDED_SERIES_TTL: Duration = Duration::from_secs(14 * DAY);
pub const UNSCHEDULED_SERIES_TTL: Duration = Duration::from_secs(5 * DAY);
pub const DEFAULT_EPISODES_TTL: Duration = Duration::from_secs(DAY);

/// TTL for a series written to the shared store on `today`.
pub fn series_ttl(series: &TvSeries, today: NaiveDate) -> Duration {
    if !series.in_production {
        return CONCLUDED_SERIES_TTL;
    }

    match series.next_release_date() {
        Some(next) => ttl_until_release((next - today).num_days()),
        None => UNSCHEDULED_SERIES_TTL,
    }
}

fn ttl_until_release(days: i64) -> Duration {
    match days {
        i64::MIN..=1 => Duration::from_secs(HOUR),
        2..=7 => Duration::from_secs(6 * HOUR),
        8..=30 => Duration::from_secs(DAY),
        31..=60 => Duration::from_secs(2 * DAY),
        _ => Duration::from_secs(5 * DAY),
    }
}

/// Episode lists never outlive the series entry they belong to.
pub fn episodes_ttl(series_remaining: Option<Duration>) -> Duration {
    series_remaining.unwrap_or(DEFAULT_EPISODES_TTL)
}

#![cfg(feature = "serde")]

use chrono::NaiveDate;
use popcorn_model::{
    Episode, SeriesId, TrackedSeriesState, TvSeries, User, UserId,
};
use serde_json::json;

#[test]
fn tracking_states_use_snake_case_names() {
    let encoded = serde_json::to_value(TrackedSeriesState::Watchlist).unwrap();
    assert_eq!(encoded, json!("watchlist"));

    let decoded: TrackedSeriesState =
        serde_json::from_value(json!("stopped")).unwrap();
    assert_eq!(decoded, TrackedSeriesState::Stopped);
}

#[test]
fn cached_series_documents_tolerate_missing_text_fields() {
    let series: TvSeries = serde_json::from_value(json!({
        "id": 1399,
        "name": "Game of Thrones",
        "seasons_count": 8,
        "episodes_count": 73,
        "first_air_date": "2011-04-17",
        "last_air_date": "2019-05-19",
        "in_production": false,
        "last_episode": null,
        "next_episode": null
    }))
    .unwrap();

    assert_eq!(series.id, SeriesId(1399));
    assert!(series.overview.is_empty());
    assert!(series.seasons.is_empty());
    assert_eq!(series.first_air_date, NaiveDate::from_ymd_opt(2011, 4, 17));
}

#[test]
fn series_survive_the_cache_codec() {
    let series = TvSeries {
        id: SeriesId(95396),
        name: "Severance".into(),
        in_production: true,
        next_episode: Some(Episode {
            series_id: SeriesId(95396),
            season_number: 2,
            episode_number: 10,
            release_date: NaiveDate::from_ymd_opt(2025, 3, 21),
            ..Episode::default()
        }),
        ..TvSeries::default()
    };

    let raw = serde_json::to_string(&series).unwrap();
    let decoded: TvSeries = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, series);
}

#[test]
fn users_never_serialize_their_password_hash() {
    let mut user = User::new("walter", "walter@example.com", "$argon2id$...");
    user.id = UserId::default();

    let encoded = serde_json::to_value(&user).unwrap();
    assert!(encoded.get("password_hash").is_none());
    assert_eq!(encoded["username"], json!("walter"));
}

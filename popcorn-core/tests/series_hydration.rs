mod support;

use std::sync::Arc;

use popcorn_core::cache::{SeriesCache, SharedSeriesCache};
use popcorn_core::model::SeriesId;
use support::{Harness, airing_series, concluded_series};
use tokio_util::sync::CancellationToken;

fn catalog() -> Vec<popcorn_core::model::TvSeries> {
    (1..=5)
        .map(|id| concluded_series(id, &format!("Series {id}")))
        .collect()
}

#[tokio::test]
async fn batch_fetches_only_the_misses_once() {
    let h = Harness::new(catalog());
    let cache = SharedSeriesCache::new(h.store.clone());
    for id in [1, 3, 5] {
        assert!(cache.set(&concluded_series(id, &format!("Series {id}"))).await);
    }

    let ids: Vec<SeriesId> = (1..=5).map(SeriesId).collect();
    let series = h
        .context
        .series()
        .get_many(&ids, &CancellationToken::new())
        .await
        .expect("hydrate");

    assert_eq!(
        series.iter().map(|s| s.id).collect::<Vec<_>>(),
        ids,
        "results follow the request order"
    );
    assert_eq!(h.catalog.total_series_calls(), 2);
    assert_eq!(h.catalog.series_calls(SeriesId(2)), 1);
    assert_eq!(h.catalog.series_calls(SeriesId(4)), 1);

    // Fetched entries were written back to the cache.
    assert!(cache.get(SeriesId(2)).await.is_some());
    assert!(cache.get(SeriesId(4)).await.is_some());

    h.context
        .series()
        .get_many(&ids, &CancellationToken::new())
        .await
        .expect("second hydrate");
    assert_eq!(h.catalog.total_series_calls(), 2);
}

#[tokio::test]
async fn repeated_ids_are_fetched_once() {
    let h = Harness::new(catalog());

    h.context
        .series()
        .get_many(
            &[SeriesId(2), SeriesId(2), SeriesId(4)],
            &CancellationToken::new(),
        )
        .await
        .expect("hydrate");

    assert_eq!(h.catalog.series_calls(SeriesId(2)), 1);
    assert_eq!(h.catalog.series_calls(SeriesId(4)), 1);
}

#[tokio::test]
async fn ids_unknown_to_the_catalog_are_dropped() {
    let h = Harness::new(catalog());

    let series = h
        .context
        .series()
        .get_many(&[SeriesId(404), SeriesId(1)], &CancellationToken::new())
        .await
        .expect("hydrate");

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].id, SeriesId(1));
    assert!(
        h.context
            .series()
            .get_by_id(SeriesId(404), &CancellationToken::new())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
async fn catalog_failures_abort_the_batch() {
    let h = Harness::new(catalog());
    h.catalog.fail_with_rate_limit();

    let err = h
        .context
        .series()
        .get_many(&[SeriesId(1), SeriesId(2)], &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "metadata.unavailable");
}

#[tokio::test]
async fn cancelled_hydration_skips_the_catalog() {
    let h = Harness::new(catalog());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .context
        .series()
        .get_many(&[SeriesId(1)], &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(h.catalog.total_series_calls(), 0);
}

#[tokio::test]
async fn lookups_by_id_read_through_the_cache() {
    let h = Harness::new([airing_series(7, "Severance", 20)]);
    let series = h.context.series();
    let cancel = CancellationToken::new();

    let first = series.get_by_id(SeriesId(7), &cancel).await.expect("first");
    let second = series.get_by_id(SeriesId(7), &cancel).await.expect("second");

    assert_eq!(first, second);
    assert_eq!(first.map(|s| s.name), Some("Severance".to_string()));
    assert_eq!(h.catalog.series_calls(SeriesId(7)), 1);
}

#[tokio::test]
async fn search_results_are_cached_per_query_and_page() {
    let h = Harness::new(catalog());
    let series = h.context.series();
    let cancel = CancellationToken::new();

    let first = series.search("series", 1, &cancel).await.expect("search");
    let again = series.search("series", 1, &cancel).await.expect("cached");
    series.search("series", 2, &cancel).await.expect("page two");

    assert_eq!(first.total_results, 5);
    assert_eq!(first, again);
    assert_eq!(h.catalog.search_calls(), 2);
}

#[tokio::test]
async fn contexts_built_in_memory_share_one_store() {
    let catalog = Arc::new(support::FakeCatalog::with_series(catalog()));
    let context = popcorn_core::PopcornContext::in_memory(
        catalog.clone(),
        &support::cache_config(),
    )
    .expect("context");
    let cancel = CancellationToken::new();

    context
        .series()
        .get_by_id(SeriesId(3), &cancel)
        .await
        .expect("lookup");
    context
        .seasons()
        .get_season(SeriesId(3), 1, &cancel)
        .await
        .expect("season");

    assert_eq!(catalog.series_calls(SeriesId(3)), 1);
    assert_eq!(catalog.season_calls(), 0);
}

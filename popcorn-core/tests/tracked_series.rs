mod support;

use chrono::Utc;
use popcorn_core::database::TrackedSeriesRepository;
use popcorn_core::model::{SeriesId, TrackedSeriesState, UserId};
use support::{Harness, airing_series, concluded_series};
use tokio_util::sync::CancellationToken;

use TrackedSeriesState::{Completed, Stopped, Watching, Watchlist};

fn harness() -> Harness {
    Harness::new([
        concluded_series(1, "Breaking Bad"),
        concluded_series(2, "Better Call Saul"),
        airing_series(3, "Slow Horses", 3),
    ])
}

async fn tracked_ids(
    harness: &Harness,
    user: UserId,
    state: TrackedSeriesState,
) -> Vec<SeriesId> {
    harness
        .context
        .tracking()
        .get_tracked(user, state, &CancellationToken::new())
        .await
        .expect("get_tracked")
        .into_iter()
        .map(|series| series.id)
        .collect()
}

#[tokio::test]
async fn starting_a_watchlisted_series_moves_it_to_watching() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(1), Watchlist, &cancel)
        .await
        .expect("watchlist");
    tracking
        .track(user, SeriesId(1), Watching, &cancel)
        .await
        .expect("watching");

    assert!(tracked_ids(&h, user, Watchlist).await.is_empty());
    assert_eq!(tracked_ids(&h, user, Watching).await, vec![SeriesId(1)]);
    assert_eq!(h.tracked.memberships(user, SeriesId(1)).await, vec![Watching]);
}

#[tokio::test]
async fn completing_removes_watchlist_and_watching_memberships() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(2), Watching, &cancel)
        .await
        .expect("watching");
    tracking
        .track(user, SeriesId(2), Completed, &cancel)
        .await
        .expect("completed");

    assert!(tracked_ids(&h, user, Watching).await.is_empty());
    assert_eq!(tracked_ids(&h, user, Completed).await, vec![SeriesId(2)]);
    assert_eq!(
        h.tracked.memberships(user, SeriesId(2)).await,
        vec![Completed]
    );
}

#[tokio::test]
async fn adding_to_watchlist_keeps_other_memberships() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(1), Watching, &cancel)
        .await
        .expect("watching");
    tracking
        .track(user, SeriesId(1), Watchlist, &cancel)
        .await
        .expect("watchlist");

    assert_eq!(
        h.tracked.memberships(user, SeriesId(1)).await,
        vec![Watchlist, Watching]
    );
}

#[tokio::test]
async fn stopping_an_unstarted_series_is_rejected_without_changes() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(1), Watchlist, &cancel)
        .await
        .expect("watchlist");

    let err = tracking
        .stop_watching(user, SeriesId(1), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "series.not_started");
    assert_eq!(
        h.tracked.memberships(user, SeriesId(1)).await,
        vec![Watchlist]
    );
}

#[tokio::test]
async fn stop_and_resume_move_between_watching_and_stopped() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(3), Watching, &cancel)
        .await
        .expect("watching");
    tracking
        .stop_watching(user, SeriesId(3), &cancel)
        .await
        .expect("stop");

    assert!(tracked_ids(&h, user, Watching).await.is_empty());
    assert_eq!(tracked_ids(&h, user, Stopped).await, vec![SeriesId(3)]);

    tracking
        .resume_watching(user, SeriesId(3), &cancel)
        .await
        .expect("resume");

    assert_eq!(tracked_ids(&h, user, Watching).await, vec![SeriesId(3)]);
    assert!(tracked_ids(&h, user, Stopped).await.is_empty());

    let err = tracking
        .resume_watching(user, SeriesId(3), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "series.not_stopped");
}

#[tokio::test]
async fn stopped_cannot_be_targeted_directly() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    let err = tracking
        .track(user, SeriesId(1), Stopped, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "series.invalid_state");

    let err = tracking
        .untrack(user, SeriesId(1), Stopped, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "series.invalid_state");
    assert!(h.tracked.memberships(user, SeriesId(1)).await.is_empty());
}

#[tokio::test]
async fn untrack_reports_whether_a_membership_was_removed() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(2), Watchlist, &cancel)
        .await
        .expect("watchlist");

    assert!(
        tracking
            .untrack(user, SeriesId(2), Watchlist, &cancel)
            .await
            .expect("untrack")
    );
    assert!(
        !tracking
            .untrack(user, SeriesId(2), Watchlist, &cancel)
            .await
            .expect("untrack again")
    );
}

#[tokio::test]
async fn untracking_watching_also_drops_a_stopped_series() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(3), Watching, &cancel)
        .await
        .expect("watching");
    tracking
        .stop_watching(user, SeriesId(3), &cancel)
        .await
        .expect("stop");

    assert!(
        tracking
            .untrack(user, SeriesId(3), Watching, &cancel)
            .await
            .expect("untrack")
    );
    assert!(h.tracked.memberships(user, SeriesId(3)).await.is_empty());
}

#[tokio::test]
async fn cancelled_transition_leaves_no_write() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let user = UserId::new();

    let err = tracking
        .track(user, SeriesId(1), Watching, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(h.tracked.memberships(user, SeriesId(1)).await.is_empty());
}

#[tokio::test]
async fn next_transition_cleans_up_after_an_interrupted_one() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    tracking
        .track(user, SeriesId(1), Watchlist, &cancel)
        .await
        .expect("watchlist");
    // The write of a Watching transition landed but its cleanup did not.
    h.tracked
        .add(user, SeriesId(1), Watching, Utc::now())
        .await
        .expect("raw add");
    assert_eq!(
        h.tracked.memberships(user, SeriesId(1)).await,
        vec![Watchlist, Watching]
    );

    tracking
        .track(user, SeriesId(1), Watching, &cancel)
        .await
        .expect("retry");

    assert_eq!(h.tracked.memberships(user, SeriesId(1)).await, vec![Watching]);
}

#[tokio::test]
async fn tracked_series_are_listed_newest_first() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    for id in [2, 1, 3] {
        tracking
            .track(user, SeriesId(id), Watchlist, &cancel)
            .await
            .expect("watchlist");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    assert_eq!(
        tracked_ids(&h, user, Watchlist).await,
        vec![SeriesId(3), SeriesId(1), SeriesId(2)]
    );
}

#[tokio::test]
async fn series_unknown_to_the_catalog_are_left_out() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let user = UserId::new();

    for id in [1, 404] {
        tracking
            .track(user, SeriesId(id), Completed, &cancel)
            .await
            .expect("completed");
    }

    assert_eq!(tracked_ids(&h, user, Completed).await, vec![SeriesId(1)]);
}

#[tokio::test]
async fn users_do_not_see_each_others_lists() {
    let h = harness();
    let tracking = h.context.tracking();
    let cancel = CancellationToken::new();
    let alice = UserId::new();
    let bob = UserId::new();

    tracking
        .track(alice, SeriesId(1), Watching, &cancel)
        .await
        .expect("watching");

    assert!(tracked_ids(&h, bob, Watching).await.is_empty());
    let err = tracking
        .stop_watching(bob, SeriesId(1), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "series.not_started");
}

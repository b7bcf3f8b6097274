mod common;

use booking_engine::error::EngineError;
use chrono::Duration;
use common::{identity, TestEngine};

#[tokio::test]
async fn test_cancel_frees_the_seat() {
    let app = TestEngine::new().await;
    let start = app.clock.now() + Duration::hours(4);
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Tiny class".to_string(), start, Some(1))
        .await
        .unwrap();

    let alice_res = app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    let err = app.engine.booking.reserve(&identity("bob"), &occurrence.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Full), "got {err:?}");

    app.engine.booking.cancel(&identity("alice"), &alice_res.id).await.unwrap();

    app.engine
        .booking
        .reserve(&identity("bob"), &occurrence.id)
        .await
        .expect("Seat freed by cancel should be bookable");
}

#[tokio::test]
async fn test_cancel_requires_ownership() {
    let app = TestEngine::new().await;
    let start = app.clock.now() + Duration::hours(4);
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), start, Some(5))
        .await
        .unwrap();

    let alice_res = app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    // Bob cannot see, let alone cancel, Alice's reservation.
    let err = app.engine.booking.cancel(&identity("bob"), &alice_res.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "got {err:?}");

    let status: String = sqlx::query_scalar("SELECT status FROM reservations WHERE id = ?")
        .bind(&alice_res.id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(status, "CONFIRMED");
}

#[tokio::test]
async fn test_double_cancel_is_reported() {
    let app = TestEngine::new().await;
    let start = app.clock.now() + Duration::hours(4);
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), start, Some(5))
        .await
        .unwrap();

    let reservation = app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    app.engine.booking.cancel(&identity("alice"), &reservation.id).await.unwrap();
    let err = app.engine.booking.cancel(&identity("alice"), &reservation.id).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCancelled), "got {err:?}");
}

#[tokio::test]
async fn test_cancelled_row_is_kept_for_history() {
    let app = TestEngine::new().await;
    let start = app.clock.now() + Duration::hours(4);
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), start, Some(5))
        .await
        .unwrap();

    let reservation = app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();
    app.clock.advance(Duration::minutes(30));
    let cancelled = app.engine.booking.cancel(&identity("alice"), &reservation.id).await.unwrap();

    assert_eq!(cancelled.status, "CANCELLED");
    assert_eq!(cancelled.cancelled_at, Some(app.clock.now()));

    let (status, cancelled_at): (String, Option<String>) =
        sqlx::query_as("SELECT status, cancelled_at FROM reservations WHERE id = ?")
            .bind(&reservation.id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(status, "CANCELLED");
    assert!(cancelled_at.is_some());
}

#[tokio::test]
async fn test_cancel_unknown_reservation() {
    let app = TestEngine::new().await;
    let err = app.engine.booking.cancel(&identity("alice"), "no-such-id").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "got {err:?}");
}

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{identity, TestEngine};
use std::collections::HashSet;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_not_yet_due_reminder_is_not_sent() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    // Lead time is 2h; the occurrence is still 3h away.
    let sent = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(sent, 0);
    assert!(app.notifier.sent_messages().is_empty());
}

#[tokio::test]
async fn test_reminder_sent_exactly_once() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    app.clock.advance(Duration::hours(1));

    let first = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(first, 1);
    let second = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(second, 0, "Repeated scans must not resend");
    let third = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(third, 0);

    let messages = app.notifier.sent_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "tg-alice");
}

#[tokio::test]
async fn test_every_confirmed_attendee_is_reminded() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();
    app.engine.booking.reserve(&identity("bob"), &occurrence.id).await.unwrap();

    app.clock.advance(Duration::hours(1));
    let sent = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(sent, 2);

    let recipients: HashSet<String> =
        app.notifier.sent_messages().into_iter().map(|(to, _)| to).collect();
    assert_eq!(recipients, HashSet::from(["tg-alice".to_string(), "tg-bob".to_string()]));
}

#[tokio::test]
async fn test_cancelled_reservation_is_not_reminded() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    let reservation = app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();
    app.engine.booking.cancel(&identity("alice"), &reservation.id).await.unwrap();

    app.clock.advance(Duration::hours(1));
    let sent = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(sent, 0);
    assert!(app.notifier.sent_messages().is_empty());
}

#[tokio::test]
async fn test_started_occurrence_reminder_is_dropped() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(1), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    // Engine was asleep until after the start; better silence than a
    // reminder for something already underway.
    app.clock.advance(Duration::hours(2));
    let sent = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(sent, 0);
    assert!(app.notifier.sent_messages().is_empty());
}

#[tokio::test]
async fn test_transient_delivery_failure_is_retried_next_scan() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    app.clock.advance(Duration::hours(1));

    app.notifier.fail_next_transient(1);
    let first = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(first, 0, "Failed delivery must not count as sent");

    let second = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(second, 1, "Released claim should be retried");

    let messages = app.notifier.sent_messages();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_permanent_delivery_failure_keeps_claim() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    app.clock.advance(Duration::hours(1));

    app.notifier.fail_next_permanent(1);
    let first = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(first, 0);

    // Dropped for good: no retry, no message.
    let second = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(second, 0);
    assert!(app.notifier.sent_messages().is_empty());

    let claimed: i32 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservations WHERE reminded_at IS NOT NULL",
    )
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(claimed, 1);
}

#[tokio::test]
async fn test_message_contains_title_and_local_start() {
    let app = TestEngine::new().await;
    // 17:30 UTC is 18:30 in Berlin that day.
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap();
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Pilates".to_string(), start, None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    app.clock.set(Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).unwrap());
    let sent = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(sent, 1);

    let messages = app.notifier.sent_messages();
    let text = &messages[0].1;
    assert!(text.starts_with("Reminder:"), "unexpected wording: {text}");
    assert!(text.contains("Pilates"), "missing title: {text}");
    assert!(text.contains("2026-03-02 18:30"), "missing local start: {text}");
}

#[tokio::test]
async fn test_overdue_reminder_is_worded_as_late() {
    let app = TestEngine::new().await;
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap();
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Pilates".to_string(), start, None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    // Due at 15:30; the engine only wakes up half an hour later.
    app.clock.set(Utc.with_ymd_and_hms(2026, 3, 2, 16, 0, 0).unwrap());
    let sent = app.engine.reminders.run_scan().await.unwrap();
    assert_eq!(sent, 1);

    let messages = app.notifier.sent_messages();
    assert!(
        messages[0].1.starts_with("Late reminder:"),
        "unexpected wording: {}",
        messages[0].1
    );
}

#[tokio::test]
async fn test_concurrent_scans_deliver_once() {
    let app = TestEngine::new().await;
    let occurrence = app
        .engine
        .schedule
        .create_adhoc_occurrence("Yoga".to_string(), app.clock.now() + Duration::hours(3), None)
        .await
        .unwrap();
    app.engine.booking.reserve(&identity("alice"), &occurrence.id).await.unwrap();

    app.clock.advance(Duration::hours(1));

    let mut set = JoinSet::new();
    for _ in 0..2 {
        let reminders = app.engine.reminders.clone();
        set.spawn(async move { reminders.run_scan().await.unwrap() });
    }

    let mut total_sent = 0u64;
    while let Some(res) = set.join_next().await {
        total_sent += res.unwrap();
    }

    assert_eq!(total_sent, 1, "Competing scanners must not double-deliver");
    assert_eq!(app.notifier.sent_messages().len(), 1);
}

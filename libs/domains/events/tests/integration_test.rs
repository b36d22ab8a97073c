//! Integration tests for the Postgres event repository.
//!
//! These use a real PostgreSQL container via testcontainers and verify
//! that the SQL backend produces the same results as the in-memory one
//! for the same inputs: slot collisions, window selection, retention.

use domain_events::{CreateEvent, EventError, EventRepository, PgEventRepository, UpdateEvent};
use test_utils::{TestDatabase, TestDataBuilder};
use uuid::Uuid;

fn create_input(user_id: Uuid, start_time: i64) -> CreateEvent {
    CreateEvent {
        id: None,
        title: "Integration event".to_string(),
        description: String::new(),
        user_id,
        start_time,
        end_time: start_time + 3600,
        notify_before: None,
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_get_event() {
    let db = TestDatabase::new().await;
    let repo = PgEventRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_create_and_get");

    let created = repo
        .create(create_input(builder.user_id(), 1000))
        .await
        .unwrap();

    let fetched = repo.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_slot_collision_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgEventRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_slot_collision");
    let user_id = builder.user_id();

    repo.create(create_input(user_id, 500)).await.unwrap();

    let result = repo.create(create_input(user_id, 500)).await;
    assert!(
        matches!(result, Err(EventError::DateBusy { .. })),
        "Expected DateBusy, got {:?}",
        result
    );

    // The same instant is free for a different owner.
    repo.create(create_input(Uuid::new_v4(), 500)).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_missing_event_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgEventRepository::new(db.connection());

    let result = repo
        .update(
            Uuid::new_v4(),
            UpdateEvent {
                title: "Ghost".to_string(),
                description: String::new(),
                start_time: 0,
                end_time: 0,
                notify_before: None,
            },
        )
        .await;

    assert!(matches!(result, Err(EventError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_notification_window_bounds() {
    let db = TestDatabase::new().await;
    let repo = PgEventRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_window_bounds");

    let mut input = create_input(builder.user_id(), 1000);
    input.notify_before = Some(60);
    let event = repo.create(input).await.unwrap();

    assert!(repo.find_for_notification(939).await.unwrap().is_empty());
    assert_eq!(
        repo.find_for_notification(940).await.unwrap(),
        vec![event.clone()]
    );
    assert_eq!(repo.find_for_notification(999).await.unwrap(), vec![event]);
    assert!(repo.find_for_notification(1000).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_notification_results_ordered_by_start_time() {
    let db = TestDatabase::new().await;
    let repo = PgEventRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_window_order");
    let user_id = builder.user_id();

    for start in [3000, 1000, 2000] {
        let mut input = create_input(user_id, start);
        input.notify_before = Some(10_000);
        repo.create(input).await.unwrap();
    }

    let events = repo.find_for_notification(900).await.unwrap();
    let starts: Vec<i64> = events.iter().map(|e| e.start_time).collect();
    assert_eq!(starts, vec![1000, 2000, 3000]);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_delete_older_than_purges_and_preserves() {
    let db = TestDatabase::new().await;
    let repo = PgEventRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_retention");
    let user_id = builder.user_id();

    repo.create(create_input(user_id, 100)).await.unwrap();
    let kept = repo.create(create_input(user_id, 300)).await.unwrap();

    assert_eq!(repo.delete_older_than(300).await.unwrap(), 1);
    assert_eq!(repo.delete_older_than(300).await.unwrap(), 0);

    let remaining = repo.list_for_user(user_id).await.unwrap();
    assert_eq!(remaining, vec![kept]);
}

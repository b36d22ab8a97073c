//! Handler tests for the events domain.
//!
//! These drive the domain router over the in-memory backend and verify
//! request/response mapping: JSON bodies, status codes, and error
//! responses. Storage-level behavior has its own tests next to the
//! repository and in the Postgres integration suite.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_events::{handlers, CalendarService, Event, InMemoryEventRepository};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot()
use uuid::Uuid;

fn app() -> axum::Router {
    let service = CalendarService::new(InMemoryEventRepository::new());
    handlers::router(service)
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_event(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_create_event_returns_201() {
    let app = app();
    let user_id = Uuid::new_v4();

    let response = app
        .oneshot(post_event(json!({
            "title": "Design review",
            "description": "weekly",
            "user_id": user_id,
            "start_time": 1000,
            "end_time": 4600,
            "notify_before": 600
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let event: Event = json_body(response.into_body()).await;
    assert_eq!(event.title, "Design review");
    assert_eq!(event.user_id, user_id);
    assert_eq!(event.notify_before, Some(600));
    assert!(!event.id.is_nil());
}

#[tokio::test]
async fn test_create_event_rejects_empty_title() {
    let app = app();

    let response = app
        .oneshot(post_event(json!({
            "title": "",
            "user_id": Uuid::new_v4(),
            "start_time": 1000,
            "end_time": 2000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_event_conflicting_slot_returns_409() {
    let app = app();
    let user_id = Uuid::new_v4();

    let body = json!({
        "title": "Standup",
        "user_id": user_id,
        "start_time": 500,
        "end_time": 900
    });

    let response = app.clone().oneshot(post_event(body.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(post_event(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_missing_event_returns_404() {
    let app = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_crud_round_trip() {
    let app = app();
    let user_id = Uuid::new_v4();

    // Create
    let response = app
        .clone()
        .oneshot(post_event(json!({
            "title": "Initial",
            "user_id": user_id,
            "start_time": 1000,
            "end_time": 2000
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Event = json_body(response.into_body()).await;

    // Update (full replacement of mutable fields)
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}", created.id))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "title": "Moved",
                        "description": "new room",
                        "start_time": 3000,
                        "end_time": 4000,
                        "notify_before": 300
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Event = json_body(response.into_body()).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Moved");
    assert_eq!(updated.start_time, 3000);

    // Get reflects the update
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Event = json_body(response.into_body()).await;
    assert_eq!(fetched, updated);

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_for_day_contains_only_that_day() {
    let app = app();
    let user_id = Uuid::new_v4();

    // 2024-07-19T10:00:00Z, one hour long, no notification.
    let response = app
        .clone()
        .oneshot(post_event(json!({
            "title": "Morning sync",
            "user_id": user_id,
            "start_time": 1_721_383_200i64,
            "end_time": 1_721_386_800i64
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Event = json_body(response.into_body()).await;

    // Day starting at 2024-07-19T00:00:00Z.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/day?user_id={}&start=1721347200", user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events: Vec<Event> = json_body(response.into_body()).await;
    assert_eq!(events, vec![created]);

    // The previous day is empty, not an error.
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/day?user_id={}&start=1721260800", user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events: Vec<Event> = json_body(response.into_body()).await;
    assert!(events.is_empty());
}

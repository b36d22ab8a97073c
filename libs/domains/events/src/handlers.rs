use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::EventResult;
use crate::models::{CreateEvent, Event, UpdateEvent};
use crate::repository::EventRepository;
use crate::service::CalendarService;

/// Create the events router with all HTTP endpoints.
pub fn router<R: EventRepository + 'static>(service: CalendarService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/period", get(list_events_for_period))
        .route("/day", get(list_events_for_day))
        .route("/week", get(list_events_for_week))
        .route("/month", get(list_events_for_month))
        .with_state(shared_service)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct PeriodQuery {
    user_id: Uuid,
    start: i64,
    end: i64,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    user_id: Uuid,
    start: i64,
}

/// GET /events?user_id=xxx
async fn list_events<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Query(query): Query<ListQuery>,
) -> EventResult<Json<Vec<Event>>> {
    let events = service.list_events(query.user_id).await?;
    Ok(Json(events))
}

/// POST /events
async fn create_event<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Json(input): Json<CreateEvent>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events/:id
async fn get_event<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Path(id): Path<Uuid>,
) -> EventResult<Json<Event>> {
    let event = service.get_event(id).await?;
    Ok(Json(event))
}

/// PUT /events/:id
async fn update_event<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEvent>,
) -> EventResult<Json<Event>> {
    let event = service.update_event(id, input).await?;
    Ok(Json(event))
}

/// DELETE /events/:id
async fn delete_event<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Path(id): Path<Uuid>,
) -> EventResult<impl IntoResponse> {
    service.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /events/period?user_id=xxx&start=..&end=..
async fn list_events_for_period<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Query(query): Query<PeriodQuery>,
) -> EventResult<Json<Vec<Event>>> {
    let events = service
        .list_events_for_period(query.user_id, query.start, query.end)
        .await?;
    Ok(Json(events))
}

/// GET /events/day?user_id=xxx&start=..
async fn list_events_for_day<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Query(query): Query<WindowQuery>,
) -> EventResult<Json<Vec<Event>>> {
    let events = service
        .list_events_for_day(query.user_id, query.start)
        .await?;
    Ok(Json(events))
}

/// GET /events/week?user_id=xxx&start=..
async fn list_events_for_week<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Query(query): Query<WindowQuery>,
) -> EventResult<Json<Vec<Event>>> {
    let events = service
        .list_events_for_week(query.user_id, query.start)
        .await?;
    Ok(Json(events))
}

/// GET /events/month?user_id=xxx&start=..
async fn list_events_for_month<R: EventRepository>(
    State(service): State<Arc<CalendarService<R>>>,
    Query(query): Query<WindowQuery>,
) -> EventResult<Json<Vec<Event>>> {
    let events = service
        .list_events_for_month(query.user_id, query.start)
        .await?;
    Ok(Json(events))
}

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, EventResult};
use crate::models::{CreateEvent, Event, UpdateEvent};
use crate::repository::EventRepository;

const DAY_SECONDS: i64 = 24 * 60 * 60;
const WEEK_SECONDS: i64 = 7 * DAY_SECONDS;
// A "month" is a fixed 30-day period; calendar months are not modelled.
const MONTH_SECONDS: i64 = 30 * DAY_SECONDS;

/// Application facade over the event store.
///
/// Stateless; the API process and the scheduler process build one each so
/// both share identical semantics. No caching, no batching.
#[derive(Clone)]
pub struct CalendarService<R: EventRepository> {
    repository: Arc<R>,
}

impl<R: EventRepository> CalendarService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new event after validating the input.
    pub async fn create_event(&self, input: CreateEvent) -> EventResult<Event> {
        input
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;
        validate_times(input.start_time, input.end_time)?;

        self.repository.create(input).await
    }

    /// Replace an existing event after validating the input.
    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event> {
        input
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;
        validate_times(input.start_time, input.end_time)?;

        self.repository.update(id, input).await
    }

    /// Delete an event by id.
    pub async fn delete_event(&self, id: Uuid) -> EventResult<()> {
        self.repository.delete(id).await
    }

    /// Get an event by id.
    pub async fn get_event(&self, id: Uuid) -> EventResult<Event> {
        self.repository
            .get(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// All events owned by a user.
    pub async fn list_events(&self, user_id: Uuid) -> EventResult<Vec<Event>> {
        self.repository.list_for_user(user_id).await
    }

    /// Events of a user with `start <= start_time < end`.
    pub async fn list_events_for_period(
        &self,
        user_id: Uuid,
        start: i64,
        end: i64,
    ) -> EventResult<Vec<Event>> {
        let events = self.list_events(user_id).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.start_time >= start && e.start_time < end)
            .collect())
    }

    /// Events of a user within the day starting at `day_start`.
    pub async fn list_events_for_day(
        &self,
        user_id: Uuid,
        day_start: i64,
    ) -> EventResult<Vec<Event>> {
        self.list_events_for_period(user_id, day_start, day_start + DAY_SECONDS)
            .await
    }

    /// Events of a user within the week starting at `week_start`.
    pub async fn list_events_for_week(
        &self,
        user_id: Uuid,
        week_start: i64,
    ) -> EventResult<Vec<Event>> {
        self.list_events_for_period(user_id, week_start, week_start + WEEK_SECONDS)
            .await
    }

    /// Events of a user within the 30-day period starting at `month_start`.
    pub async fn list_events_for_month(
        &self,
        user_id: Uuid,
        month_start: i64,
    ) -> EventResult<Vec<Event>> {
        self.list_events_for_period(user_id, month_start, month_start + MONTH_SECONDS)
            .await
    }

    /// Events whose notification window contains `now`.
    pub async fn events_for_notification(&self, now: i64) -> EventResult<Vec<Event>> {
        self.repository.find_for_notification(now).await
    }

    /// Hard-delete events older than `cutoff`.
    pub async fn delete_old_events(&self, cutoff: i64) -> EventResult<u64> {
        self.repository.delete_older_than(cutoff).await
    }
}

fn validate_times(start_time: i64, end_time: i64) -> EventResult<()> {
    if end_time < start_time {
        return Err(EventError::Validation(
            "end_time must not precede start_time".to_string(),
        ));
    }
    Ok(())
}

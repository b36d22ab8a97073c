use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{CreateEvent, Event, UpdateEvent};

/// Repository contract for event persistence.
///
/// Both backends answer the same queries with the same results; the
/// backend is selected at process startup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event. Fails with date-busy when the owner already has
    /// an event at the same start instant.
    async fn create(&self, input: CreateEvent) -> EventResult<Event>;

    /// Replace the mutable fields of an existing event. Fails with
    /// not-found when the id is unknown and with date-busy when the new
    /// start instant collides with another event of the same owner.
    async fn update(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event>;

    /// Remove an event. Fails with not-found when the id is unknown.
    async fn delete(&self, id: Uuid) -> EventResult<()>;

    /// Fetch an event by id.
    async fn get(&self, id: Uuid) -> EventResult<Option<Event>>;

    /// All events owned by a user, order unspecified.
    async fn list_for_user(&self, user_id: Uuid) -> EventResult<Vec<Event>>;

    /// Every event whose notification window contains `now`:
    /// `notify_before` set and `start_time - notify_before <= now <
    /// start_time`. Ordered by `start_time` ascending. Pure read.
    async fn find_for_notification(&self, now: i64) -> EventResult<Vec<Event>>;

    /// Delete every event with `start_time < cutoff`. Returns the number
    /// of removed events; an empty result is not an error.
    async fn delete_older_than(&self, cutoff: i64) -> EventResult<u64>;
}

/// In-memory backend: a readers-writer locked map keyed by event id.
///
/// Reads take the read guard; every mutation takes the write guard, so
/// the slot-uniqueness scan and the insert happen atomically.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, input: CreateEvent) -> EventResult<Event> {
        let mut events = self.events.write().await;

        let slot_taken = events
            .values()
            .any(|e| e.user_id == input.user_id && e.start_time == input.start_time);
        if slot_taken {
            return Err(EventError::DateBusy {
                user_id: input.user_id,
                start_time: input.start_time,
            });
        }

        let event = Event::new(input);
        events.insert(event.id, event.clone());

        tracing::info!(event_id = %event.id, user_id = %event.user_id, "Created event");
        Ok(event)
    }

    async fn update(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event> {
        let mut events = self.events.write().await;

        let user_id = events.get(&id).ok_or(EventError::NotFound(id))?.user_id;

        let slot_taken = events
            .values()
            .any(|e| e.id != id && e.user_id == user_id && e.start_time == input.start_time);
        if slot_taken {
            return Err(EventError::DateBusy {
                user_id,
                start_time: input.start_time,
            });
        }

        let event = events
            .get_mut(&id)
            .ok_or(EventError::NotFound(id))?;
        event.apply_update(input);
        let updated = event.clone();

        tracing::info!(event_id = %id, "Updated event");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> EventResult<()> {
        let mut events = self.events.write().await;

        events.remove(&id).ok_or(EventError::NotFound(id))?;

        tracing::info!(event_id = %id, "Deleted event");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> EventResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> EventResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_for_notification(&self, now: i64) -> EventResult<Vec<Event>> {
        let events = self.events.read().await;

        let mut result: Vec<Event> = events
            .values()
            .filter(|e| match e.notify_from() {
                Some(from) => from <= now && now < e.start_time,
                None => false,
            })
            .cloned()
            .collect();

        result.sort_by_key(|e| e.start_time);
        Ok(result)
    }

    async fn delete_older_than(&self, cutoff: i64) -> EventResult<u64> {
        let mut events = self.events.write().await;

        let before = events.len();
        events.retain(|_, e| e.start_time >= cutoff);
        let removed = (before - events.len()) as u64;

        if removed > 0 {
            tracing::info!(removed, cutoff, "Purged old events");
        }
        Ok(removed)
    }
}

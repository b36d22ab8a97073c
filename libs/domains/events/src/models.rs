use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A calendar event owned by a single user.
///
/// All instants are absolute epoch seconds; the core never performs
/// time-zone arithmetic. `notify_before == None` means no notification is
/// ever scheduled; `Some(0)` means "notify at start", which the half-open
/// notification window makes unreachable by design of the window bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, assigned on create when absent
    pub id: Uuid,
    /// Short human-readable title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Owner; immutable for the lifetime of the event
    pub user_id: Uuid,
    /// Start instant, epoch seconds
    pub start_time: i64,
    /// End instant, epoch seconds; never precedes `start_time`
    pub end_time: i64,
    /// Notification lead time in seconds before `start_time`
    pub notify_before: Option<i64>,
}

impl Event {
    /// Materialize an event from a create request.
    pub fn new(input: CreateEvent) -> Self {
        Self {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            title: input.title,
            description: input.description,
            user_id: input.user_id,
            start_time: input.start_time,
            end_time: input.end_time,
            notify_before: input.notify_before,
        }
    }

    /// Replace the mutable fields. `id` and `user_id` never change.
    pub fn apply_update(&mut self, update: UpdateEvent) {
        self.title = update.title;
        self.description = update.description;
        self.start_time = update.start_time;
        self.end_time = update.end_time;
        self.notify_before = update.notify_before;
    }

    /// Lower bound of the notification window, if one exists.
    pub fn notify_from(&self) -> Option<i64> {
        self.notify_before.map(|lead| self.start_time - lead)
    }
}

/// DTO for creating a new event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    /// Client-supplied id; generated when omitted
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub user_id: Uuid,
    pub start_time: i64,
    pub end_time: i64,
    #[validate(range(min = 0, message = "notify_before must be non-negative"))]
    pub notify_before: Option<i64>,
}

/// DTO for replacing an existing event.
///
/// The update is a full replacement of the mutable fields; ownership and
/// id are immutable.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEvent {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: i64,
    pub end_time: i64,
    #[validate(range(min = 0, message = "notify_before must be non-negative"))]
    pub notify_before: Option<i64>,
}

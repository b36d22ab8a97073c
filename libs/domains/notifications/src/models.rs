use messaging::QueueMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification message as it travels through the queue.
///
/// Wire format is a single UTF-8 JSON object:
/// `{"event_id":"<uuid>","title":"...","event_time":<epoch>,"user_id":"<uuid>"}`.
/// Field order is not significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event_id: Uuid,
    pub title: String,
    /// Event start instant, epoch seconds
    pub event_time: i64,
    pub user_id: Uuid,
}

impl Notification {
    pub fn new(event_id: Uuid, title: impl Into<String>, event_time: i64, user_id: Uuid) -> Self {
        Self {
            event_id,
            title: title.into(),
            event_time,
            user_id,
        }
    }
}

impl QueueMessage for Notification {
    fn message_id(&self) -> String {
        self.event_id.to_string()
    }
}

/// Delivery status of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Processed,
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStatus::Processed => write!(f, "processed"),
        }
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(NotificationStatus::Processed),
            other => Err(format!("unknown notification status '{}'", other)),
        }
    }
}

/// Audit record persisted by the sender, keyed by a fresh id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub event_time: i64,
    pub status: NotificationStatus,
    pub created_at: i64,
    pub processed_at: i64,
}

impl NotificationRecord {
    /// Audit row for a processed notification, stamped with `now`.
    pub fn processed(notification: &Notification, now: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: notification.event_id,
            user_id: notification.user_id,
            title: notification.title.clone(),
            event_time: notification.event_time,
            status: NotificationStatus::Processed,
            created_at: now,
            processed_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_field_names() {
        let notification = Notification::new(
            Uuid::parse_str("6f8a1c9e-0000-4000-8000-000000000001").unwrap(),
            "Standup",
            2000,
            Uuid::parse_str("6f8a1c9e-0000-4000-8000-000000000002").unwrap(),
        );

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event_id": "6f8a1c9e-0000-4000-8000-000000000001",
                "title": "Standup",
                "event_time": 2000,
                "user_id": "6f8a1c9e-0000-4000-8000-000000000002"
            })
        );
    }

    #[test]
    fn test_wire_round_trip() {
        let notification = Notification::new(Uuid::new_v4(), "Standup", 2000, Uuid::new_v4());

        let bytes = serde_json::to_vec(&notification).unwrap();
        let decoded: Notification = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, notification);
    }

    #[test]
    fn test_status_round_trip() {
        let status: NotificationStatus = "processed".parse().unwrap();
        assert_eq!(status, NotificationStatus::Processed);
        assert_eq!(status.to_string(), "processed");

        assert!("delivered".parse::<NotificationStatus>().is_err());
    }

    #[test]
    fn test_processed_record_copies_message_fields() {
        let notification = Notification::new(Uuid::new_v4(), "Standup", 2000, Uuid::new_v4());
        let record = NotificationRecord::processed(&notification, 5000);

        assert_eq!(record.event_id, notification.event_id);
        assert_eq!(record.user_id, notification.user_id);
        assert_eq!(record.title, "Standup");
        assert_eq!(record.event_time, 2000);
        assert_eq!(record.status, NotificationStatus::Processed);
        assert_eq!(record.created_at, 5000);
        assert_eq!(record.processed_at, 5000);
        assert_ne!(record.id, notification.event_id);
    }
}

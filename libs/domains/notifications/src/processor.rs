use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use messaging::{MessageProcessor, ProcessingError};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{Notification, NotificationRecord};
use crate::repository::NotificationRepository;

/// Sender-side processor: one invocation per delivered notification.
///
/// Emits exactly one STDOUT line per delivery and, when an audit store is
/// configured, records the delivery status first. Audit failures are
/// logged and never block acknowledgement; the notification still counts
/// as delivered.
pub struct NotificationProcessor<A: NotificationRepository> {
    audit: Option<Arc<A>>,
}

impl<A: NotificationRepository> NotificationProcessor<A> {
    pub fn new(audit: Option<A>) -> Self {
        Self {
            audit: audit.map(Arc::new),
        }
    }
}

/// Render an epoch-seconds instant as RFC 3339 UTC.
pub fn format_event_time(event_time: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(event_time, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[async_trait]
impl<A: NotificationRepository> MessageProcessor<Notification> for NotificationProcessor<A> {
    async fn process(&self, message: &Notification) -> Result<(), ProcessingError> {
        let event_time = format_event_time(message.event_time).ok_or_else(|| {
            ProcessingError::new(format!(
                "event_time {} is not representable",
                message.event_time
            ))
        })?;

        if let Some(audit) = &self.audit {
            let now = Utc::now().timestamp();
            let record = NotificationRecord::processed(message, now);
            if let Err(e) = audit.record(record).await {
                // Delivery proceeds; the audit row is best-effort.
                error!(event_id = %message.event_id, error = %e, "Failed to record notification status");
            }
        }

        println!(
            "[NOTIFICATION] Event: {} | Title: {} | User: {} | Time: {}",
            message.event_id, message.title, message.user_id, event_time
        );

        info!(
            event_id = %message.event_id,
            user_id = %message.user_id,
            title = %message.title,
            time = %event_time,
            "Notification processed"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "notification_sender"
    }
}

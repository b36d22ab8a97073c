use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::NotificationRecord;

/// Audit store for delivered notifications.
///
/// Writes here are best-effort from the sender's point of view: a failed
/// insert is logged and never blocks acknowledgement.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist one audit record.
    async fn record(&self, record: NotificationRecord) -> NotificationResult<()>;

    /// All audit records for one event, in insertion order.
    async fn list_for_event(&self, event_id: Uuid) -> NotificationResult<Vec<NotificationRecord>>;
}

/// In-memory audit store for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationRepository {
    records: Arc<RwLock<Vec<NotificationRecord>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn record(&self, record: NotificationRecord) -> NotificationResult<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn list_for_event(&self, event_id: Uuid) -> NotificationResult<Vec<NotificationRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }
}

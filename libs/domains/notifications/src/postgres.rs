use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entity;
use crate::error::{NotificationError, NotificationResult};
use crate::models::NotificationRecord;
use crate::repository::NotificationRepository;

/// PostgreSQL audit store. The `notifications` table is disjoint from the
/// event store; the sender is its only writer.
pub struct PgNotificationRepository {
    db: DatabaseConnection,
}

impl PgNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn record(&self, record: NotificationRecord) -> NotificationResult<()> {
        let active_model: entity::ActiveModel = record.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(NotificationError::internal)?;

        tracing::debug!(
            notification_id = %model.id,
            event_id = %model.event_id,
            "Recorded notification status"
        );
        Ok(())
    }

    async fn list_for_event(&self, event_id: Uuid) -> NotificationResult<Vec<NotificationRecord>> {
        let models = entity::Entity::find()
            .filter(entity::Column::EventId.eq(event_id))
            .order_by_asc(entity::Column::ProcessedAt)
            .all(&self.db)
            .await
            .map_err(NotificationError::internal)?;

        models
            .into_iter()
            .map(|m| m.try_into().map_err(NotificationError::Internal))
            .collect()
    }
}

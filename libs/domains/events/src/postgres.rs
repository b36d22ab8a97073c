use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entity;
use crate::error::{EventError, EventResult};
use crate::models::{CreateEvent, Event, UpdateEvent};
use crate::repository::EventRepository;

/// PostgreSQL backend of the event repository.
///
/// Slot-uniqueness is enforced by a pre-check here and backed by the
/// unique `(user_id, start_time)` index from the migrations.
pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn slot_taken(
        &self,
        user_id: Uuid,
        start_time: i64,
        exclude: Option<Uuid>,
    ) -> EventResult<bool> {
        let mut query = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .filter(entity::Column::StartTime.eq(start_time));

        if let Some(id) = exclude {
            query = query.filter(entity::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.db)
            .await
            .map_err(EventError::internal)?;

        Ok(existing.is_some())
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, input: CreateEvent) -> EventResult<Event> {
        if self
            .slot_taken(input.user_id, input.start_time, None)
            .await?
        {
            return Err(EventError::DateBusy {
                user_id: input.user_id,
                start_time: input.start_time,
            });
        }

        let event = Event::new(input);
        let active_model: entity::ActiveModel = event.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(EventError::internal)?;

        tracing::info!(event_id = %model.id, user_id = %model.user_id, "Created event");
        Ok(model.into())
    }

    async fn update(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(EventError::internal)?
            .ok_or(EventError::NotFound(id))?;

        if self
            .slot_taken(model.user_id, input.start_time, Some(id))
            .await?
        {
            return Err(EventError::DateBusy {
                user_id: model.user_id,
                start_time: input.start_time,
            });
        }

        let mut event: Event = model.into();
        event.apply_update(input);

        let active_model: entity::ActiveModel = event.into();
        let updated = active_model
            .update(&self.db)
            .await
            .map_err(EventError::internal)?;

        tracing::info!(event_id = %id, "Updated event");
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> EventResult<()> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(EventError::internal)?;

        if result.rows_affected == 0 {
            return Err(EventError::NotFound(id));
        }

        tracing::info!(event_id = %id, "Deleted event");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> EventResult<Option<Event>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(EventError::internal)?;

        Ok(model.map(Into::into))
    }

    async fn list_for_user(&self, user_id: Uuid) -> EventResult<Vec<Event>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(EventError::internal)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_for_notification(&self, now: i64) -> EventResult<Vec<Event>> {
        // notify_before IS NOT NULL
        //   AND start_time - notify_before <= now AND start_time > now
        let models = entity::Entity::find()
            .filter(entity::Column::NotifyBefore.is_not_null())
            .filter(
                Expr::col(entity::Column::StartTime)
                    .sub(Expr::col(entity::Column::NotifyBefore))
                    .lte(now),
            )
            .filter(entity::Column::StartTime.gt(now))
            .order_by_asc(entity::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(EventError::internal)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_older_than(&self, cutoff: i64) -> EventResult<u64> {
        let result = entity::Entity::delete_many()
            .filter(entity::Column::StartTime.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(EventError::internal)?;

        if result.rows_affected > 0 {
            tracing::info!(removed = result.rows_affected, cutoff, "Purged old events");
        }
        Ok(result.rows_affected)
    }
}

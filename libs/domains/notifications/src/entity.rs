use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;

use crate::models::{NotificationRecord, NotificationStatus};

/// Sea-ORM entity for the `notifications` audit table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub event_time: i64,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub created_at: i64,
    pub processed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<NotificationRecord> for ActiveModel {
    fn from(record: NotificationRecord) -> Self {
        ActiveModel {
            id: Set(record.id),
            event_id: Set(record.event_id),
            user_id: Set(record.user_id),
            title: Set(record.title),
            event_time: Set(record.event_time),
            status: Set(record.status.to_string()),
            created_at: Set(record.created_at),
            processed_at: Set(record.processed_at),
        }
    }
}

impl TryFrom<Model> for NotificationRecord {
    type Error = String;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: NotificationStatus = model.status.parse()?;

        Ok(Self {
            id: model.id,
            event_id: model.event_id,
            user_id: model.user_id,
            title: model.title,
            event_time: model.event_time,
            status,
            created_at: model.created_at,
            processed_at: model.processed_at,
        })
    }
}

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;

/// Sea-ORM entity for the `events` table.
///
/// Instants are stored as epoch seconds (`bigint`), exactly as the domain
/// model carries them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub user_id: Uuid,
    pub start_time: i64,
    pub end_time: i64,
    pub notify_before: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            user_id: model.user_id,
            start_time: model.start_time,
            end_time: model.end_time,
            notify_before: model.notify_before,
        }
    }
}

impl From<crate::models::Event> for ActiveModel {
    fn from(event: crate::models::Event) -> Self {
        ActiveModel {
            id: Set(event.id),
            title: Set(event.title),
            description: Set(event.description),
            user_id: Set(event.user_id),
            start_time: Set(event.start_time),
            end_time: Set(event.end_time),
            notify_before: Set(event.notify_before),
        }
    }
}

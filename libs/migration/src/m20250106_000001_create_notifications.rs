use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(pk_uuid(Notifications::Id))
                    .col(uuid(Notifications::EventId))
                    .col(uuid(Notifications::UserId))
                    .col(text(Notifications::Title))
                    .col(big_integer(Notifications::EventTime))
                    .col(text(Notifications::Status))
                    .col(big_integer(Notifications::CreatedAt))
                    .col(big_integer(Notifications::ProcessedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_event_id")
                    .table(Notifications::Table)
                    .col(Notifications::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    EventId,
    UserId,
    Title,
    EventTime,
    Status,
    CreatedAt,
    ProcessedAt,
}

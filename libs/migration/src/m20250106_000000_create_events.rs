use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_uuid(Events::Id))
                    .col(text(Events::Title))
                    .col(text(Events::Description).default(""))
                    .col(uuid(Events::UserId))
                    .col(big_integer(Events::StartTime))
                    .col(big_integer(Events::EndTime))
                    .col(big_integer_null(Events::NotifyBefore))
                    .to_owned(),
            )
            .await?;

        // Owner listing
        manager
            .create_index(
                Index::create()
                    .name("idx_events_user_id")
                    .table(Events::Table)
                    .col(Events::UserId)
                    .to_owned(),
            )
            .await?;

        // Notification selection and retention purge
        manager
            .create_index(
                Index::create()
                    .name("idx_events_start_time")
                    .table(Events::Table)
                    .col(Events::StartTime)
                    .to_owned(),
            )
            .await?;

        // One event per owner per start instant
        manager
            .create_index(
                Index::create()
                    .name("uniq_events_user_slot")
                    .table(Events::Table)
                    .col(Events::UserId)
                    .col(Events::StartTime)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Description,
    UserId,
    StartTime,
    EndTime,
    NotifyBefore,
}

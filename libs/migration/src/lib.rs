pub use sea_orm_migration::prelude::*;

mod m20250106_000000_create_events;
mod m20250106_000001_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250106_000000_create_events::Migration),
            Box::new(m20250106_000001_create_notifications::Migration),
        ]
    }
}

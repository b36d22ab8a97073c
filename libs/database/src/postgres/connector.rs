use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{info, log::LevelFilter};

use super::PostgresConfig;
use crate::retry::{retry_with_backoff, RetryConfig};

/// Connect to PostgreSQL with pooled connection settings.
pub async fn connect(config: &PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url());
    options
        .max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(options).await?;

    info!(host = %config.host, dbname = %config.dbname, "Connected to PostgreSQL");

    Ok(db)
}

/// Connect to PostgreSQL, retrying transient startup failures with
/// exponential backoff.
pub async fn connect_with_retry(
    config: &PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    retry_with_backoff(|| connect(config), retry_config.unwrap_or_default()).await
}

/// Apply pending migrations before the process starts serving.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DbErr> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None).await?;
    info!(app = app_name, "Migrations applied");
    Ok(())
}

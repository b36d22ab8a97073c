//! Calendar sender process: consumes notification messages from the queue,
//! records delivery status, prints one line per notification to STDOUT, and
//! acknowledges each delivery.

mod config;
mod shutdown;

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_notifications::{Notification, NotificationProcessor, PgNotificationRepository};
use eyre::Result;
use messaging::{NatsConsumer, NatsQueue};
use tracing::{error, info, warn};

use config::Config;

/// Exit code for configuration/startup failures.
const STARTUP_FAILURE_CODE: i32 = 111;

#[derive(Parser)]
#[command(name = "calendar-sender")]
#[command(about = "Queue consumer that delivers calendar notifications")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print build information and exit
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    if let Some(Commands::Version) = cli.command {
        let info = core_config::app_info!();
        println!("{} {}", info.name, info.version);
        return Ok(());
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(STARTUP_FAILURE_CODE);
        }
    };
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        "Starting calendar sender"
    );

    let (queue, consumer, processor) = match bootstrap(&config).await {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = ?e, "Startup failed");
            std::process::exit(STARTUP_FAILURE_CODE);
        }
    };

    info!("Sender started, waiting for notifications");

    let shutdown = shutdown::shutdown_watch();
    consumer
        .consume::<Notification, _>(processor, shutdown)
        .await?;

    queue.close().await?;
    info!("Sender shutdown complete");
    Ok(())
}

/// Everything that must succeed before consuming: optional audit store,
/// broker connection, queue declaration.
async fn bootstrap(
    config: &Config,
) -> Result<(
    NatsQueue,
    NatsConsumer,
    NotificationProcessor<PgNotificationRepository>,
)> {
    let audit = match &config.database {
        Some(db_config) => {
            let db = database::connect_with_retry(db_config, None).await?;
            if let Err(e) = database::run_migrations::<migration::Migrator>(&db, "calendar-sender").await {
                warn!(error = %e, "Failed to apply migrations, continuing without them");
            }
            Some(PgNotificationRepository::new(db))
        }
        None => {
            info!("No audit store configured, delivery status will not be persisted");
            None
        }
    };

    let queue = NatsQueue::connect(&config.nats).await?;
    queue.declare(&config.nats.queue).await?;
    let consumer = queue.consumer(&config.nats.queue);

    info!(queue = %config.nats.queue, "Queue declared");

    let processor = NotificationProcessor::new(audit);

    Ok((queue, consumer, processor))
}

//! Calendar scheduler process: scans the event store for open notification
//! windows, enqueues one message per event per tick, and purges events past
//! the retention window.

mod config;
mod scheduler;
mod shutdown;

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_events::{CalendarService, PgEventRepository};
use eyre::Result;
use messaging::{NatsPublisher, NatsQueue};
use tracing::{error, info};

use config::Config;
use scheduler::Scheduler;

/// Exit code for configuration/startup failures.
const STARTUP_FAILURE_CODE: i32 = 111;

#[derive(Parser)]
#[command(name = "calendar-scheduler")]
#[command(about = "Periodic scanner that enqueues calendar notifications")]
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
        "Starting calendar scheduler"
    );

    let (queue, scheduler) = match bootstrap(&config).await {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = ?e, "Startup failed");
            std::process::exit(STARTUP_FAILURE_CODE);
        }
    };

    let shutdown = shutdown::shutdown_watch();
    scheduler.run(config.interval, shutdown).await;

    queue.close().await?;
    info!("Scheduler shutdown complete");
    Ok(())
}

/// Everything that must succeed before the first tick: database with
/// migrations, broker connection, queue declaration.
async fn bootstrap(
    config: &Config,
) -> Result<(NatsQueue, Scheduler<PgEventRepository, NatsPublisher>)> {
    let db = database::connect_with_retry(&config.database, None).await?;
    database::run_migrations::<migration::Migrator>(&db, "calendar-scheduler").await?;

    let queue = NatsQueue::connect(&config.nats).await?;
    queue.declare(&config.nats.queue).await?;
    let publisher = queue.publisher(&config.nats.queue);

    info!(queue = %config.nats.queue, "Queue declared");

    let service = CalendarService::new(PgEventRepository::new(db));
    let scheduler = Scheduler::new(service, publisher);

    Ok((queue, scheduler))
}

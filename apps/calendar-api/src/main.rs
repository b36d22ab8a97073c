//! Calendar API process: HTTP CRUD over the shared event store.

mod config;
mod middleware;
mod shutdown;

use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_events::{handlers, CalendarService, InMemoryEventRepository, PgEventRepository};
use eyre::Result;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use config::{Config, StorageType};

/// Exit code for configuration/startup failures.
const STARTUP_FAILURE_CODE: i32 = 111;

#[derive(Parser)]
#[command(name = "calendar-api")]
#[command(about = "Calendar HTTP API serving event CRUD and period queries")]
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
        "Starting calendar API"
    );

    let (listener, app) = match bootstrap(&config).await {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = ?e, "Startup failed");
            std::process::exit(STARTUP_FAILURE_CODE);
        }
    };

    info!(
        address = %config.server.address(),
        storage = ?config.storage,
        "Calendar API listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown::shutdown_signal())
    .await?;

    info!("Calendar API shutdown complete");
    Ok(())
}

/// Everything that must succeed before serving: storage backend,
/// migrations, router, listener.
async fn bootstrap(config: &Config) -> Result<(TcpListener, Router)> {
    let events_router = match config.storage {
        StorageType::Memory => {
            info!("Using in-memory event store");
            let service = CalendarService::new(InMemoryEventRepository::new());
            handlers::router(service)
        }
        StorageType::Sql => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| eyre::eyre!("sql storage selected without database config"))?;

            let db = database::connect_with_retry(db_config, None).await?;
            database::run_migrations::<migration::Migrator>(&db, "calendar-api").await?;

            let service = CalendarService::new(PgEventRepository::new(db));
            handlers::router(service)
        }
    };

    let app = Router::new()
        .route("/hello", get(hello))
        .nest("/events", events_router)
        .layer(axum::middleware::from_fn(middleware::log_requests));

    let listener = TcpListener::bind(config.server.address()).await?;

    Ok((listener, app))
}

async fn hello() -> &'static str {
    "hello world\n"
}

//! Graceful shutdown on SIGINT/SIGTERM.

use tokio::signal;
use tracing::info;

/// Resolve when the process receives SIGINT (Ctrl+C) or SIGTERM.
///
/// Used with `axum::serve(..).with_graceful_shutdown(..)` so in-flight
/// requests get a chance to drain.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

//! OS signal handling.
//!
//! # Design Decisions
//! - SIGINT and SIGTERM both mean graceful shutdown; the provisioner and
//!   init systems send SIGTERM, a terminal sends SIGINT
//! - A closed coordinator counts as a shutdown request, so dropping the
//!   `Shutdown` handle also winds the server down

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;

/// Resolve when a shutdown is requested by signal or coordinator.
pub async fn shutdown_requested(mut external: broadcast::Receiver<()>) {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(error) => {
            // Without a SIGTERM stream we still honor SIGINT and the
            // coordinator.
            tracing::error!(error = %error, "Failed to install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = external.recv() => {}
            }
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("SIGINT received, shutting down");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, shutting down");
        }
        _ = external.recv() => {
            tracing::info!("Shutdown triggered");
        }
    }
}

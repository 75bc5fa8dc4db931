//! POS server binary.
//!
//! Loads and validates configuration, builds the runtime with the
//! configured worker count, prepares the database, and serves until a
//! shutdown signal arrives.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pos_server::config::{self, ServerConfig};
use pos_server::lifecycle::Shutdown;
use pos_server::{db, net, observability, users, HttpServer};

#[derive(Parser)]
#[command(name = "pos-server", about = "Point-of-sale backend API server", version)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "pos.toml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load_config(&args.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "pos_server={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.listener.workers,
        database = %config.database.url,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.listener.workers)
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let pool = db::connect(&config.database).await?;
    db::ensure_schema(&pool).await?;
    users::bootstrap_superuser(&pool, &config.auth).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, pool);

    match &config.listener.tls {
        Some(tls_config) => {
            let addr = config.listener.bind_address.parse()?;
            let tls = net::tls::load_tls_config(tls_config).await?;
            server.run_tls(addr, tls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = bind_listener(&config.listener.bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Bind the listener, pointing the operator at the port grant when a
/// privileged bind is refused.
async fn bind_listener(bind_address: &str) -> Result<tokio::net::TcpListener, std::io::Error> {
    match tokio::net::TcpListener::bind(bind_address).await {
        Ok(listener) => Ok(listener),
        Err(error) => {
            if error.kind() == std::io::ErrorKind::PermissionDenied {
                tracing::error!(
                    bind_address = %bind_address,
                    "Permission denied binding a privileged port; run under authbind \
                     after granting it (pos-provision apply)"
                );
            }
            Err(error)
        }
    }
}

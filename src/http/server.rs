//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, CORS,
//!   access log)
//! - Serve plain TCP or TLS with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use axum::extract::DefaultBodyLimit;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::auth::token::TokenSigner;
use crate::catalog::{items, stores};
use crate::config::schema::CorsConfig;
use crate::config::ServerConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::shutdown_requested;
use crate::observability::access_log::access_log;
use crate::sales::{totals, transactions};
use crate::users;

/// How long in-flight requests get to drain during a TLS shutdown.
const TLS_DRAIN_SECS: u64 = 30;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: Arc<TokenSigner>,
}

/// HTTP server for the POS backend.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and database
    /// pool.
    pub fn new(config: &ServerConfig, db: SqlitePool) -> Self {
        let tokens = Arc::new(TokenSigner::new(
            &config.auth.secret,
            config.auth.token_expiry_mins,
        ));
        let state = AppState { db, tokens };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all routes and middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/token", post(auth::handlers::login))
            .route("/users", post(users::create_user).get(users::list_users))
            .route("/users/me", get(users::me))
            .route("/item", post(items::create).get(items::list))
            .route("/item/tree", get(items::tree))
            .route(
                "/item/{id}",
                get(items::read).put(items::update).delete(items::remove),
            )
            .route("/store", post(stores::create).get(stores::list))
            .route(
                "/store/{id}",
                get(stores::read).put(stores::update).delete(stores::remove),
            )
            .route(
                "/transaction",
                post(transactions::create).get(transactions::list),
            )
            .route(
                "/transaction/{id}",
                get(transactions::read)
                    .put(transactions::update)
                    .delete(transactions::remove),
            )
            .route("/total", post(totals::create).get(totals::list))
            .with_state(state)
            .layer(
                // First layer is outermost: the request ID exists before
                // anything traces, the access log runs closest to the
                // handlers so it sees the matched route.
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(cors_layer(&config.cors))
                    .layer(DefaultBodyLimit::max(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(middleware::from_fn(access_log)),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// a shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_requested(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let handle = axum_server::Handle::new();
        {
            let handle = handle.clone();
            tokio::spawn(async move {
                shutdown_requested(shutdown).await;
                handle.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
            });
        }

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Service banner. Doubles as the liveness probe the provisioning tool
/// polls after launch.
async fn root() -> &'static str {
    "pos"
}

/// Restrict browsers to the configured origins while mirroring whatever
/// methods and headers they ask for (credentialed CORS forbids
/// wildcards).
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

//! Staffing back-office server
//!
//! Wires the Postgres stores, local blob storage and headless Chromium into
//! the teaching-contract API.

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staffing_api::AppState;
use staffing_auth::{Authenticator, JwtService};
use staffing_core::clock::SystemClock;
use staffing_core::config::AppConfig;
use staffing_db::{Database, DatabaseConfig, PgContractStore, PgDirectory};
use staffing_documents::{ChromiumEngine, LocalStorage};
use staffing_services::{ContractService, ContractServiceConfig, RateResolver};

mod health;

use health::{HealthChecker, HealthConfig};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("JWT_SECRET is not set, using the built-in development secret");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting staffing server"
    );

    let db = Database::connect(&DatabaseConfig::from(&config.database))
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to apply migrations")?;
    info!("Connected to database");

    tokio::fs::create_dir_all(&config.storage.local_path)
        .await
        .with_context(|| format!("cannot create storage root {}", config.storage.local_path))?;

    let pool = db.pool().clone();
    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let contracts = ContractService::new(
        Arc::new(PgContractStore::new(pool)),
        directory.clone(),
        RateResolver::new(directory),
        Arc::new(LocalStorage::new(&config.storage.local_path)),
        Arc::new(ChromiumEngine::with_temp_dir(&config.contracts.chromium_path)),
        Arc::new(SystemClock),
    )
    .with_config(ContractServiceConfig::from(&config.contracts));

    let jwt = Arc::new(JwtService::new(config.auth.jwt_secret.as_bytes()));
    let state = AppState::new(contracts, Authenticator::new(jwt));

    let health = Arc::new(
        HealthChecker::new(HealthConfig::default())
            .with_database(db.clone())
            .with_storage_root(&config.storage.local_path),
    );

    let app = build_router(state, health, config.server.max_body_size_bytes);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Human-readable logs by default, JSON lines when `LOG_FORMAT=json`
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,staffing_server=debug,staffing_api=debug,staffing_services=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, max_body_bytes: usize) -> Router {
    // no auth on health routes
    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(staffing_api::router().with_state(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

//! Student Records Backend
//!
//! HTTP service for student self-service and admin record management.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling, routing and the auth gate
//! - Services: Login, registration and record management
//! - Repositories: Record stores (PostgreSQL or in-memory)

use anyhow::Result;
use student_records_backend::{
    config::AppConfig, db, routes, services::AuthService, state::AppState, telemetry,
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    telemetry::init_tracing();

    let config = AppConfig::load()?;
    let production = AppConfig::is_production();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if production { "production" } else { "development" },
        "Starting Student Records Backend"
    );

    if let Err(e) = config.validate(production) {
        error!("Configuration error: {:#}", e);
        return Err(e);
    }

    let metrics = telemetry::init_metrics()?;

    let state = if config.database.is_in_memory() {
        warn!("Using in-memory record store; data is lost on shutdown");
        let state = AppState::in_memory(config.clone());
        bootstrap_memory_admin(&state).await?;
        state
    } else {
        info!("Connecting to database...");
        let db_pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

        // Production runs migrations as a separate job
        if !production {
            db::run_migrations(&db_pool).await?;
        }

        AppState::with_postgres(db_pool, config.clone())
    };
    let state = state.with_metrics(metrics);

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Seed the admin account for in-memory runs from the environment
///
/// Reads `SR_BOOTSTRAP_ADMIN_EMAIL` and `SR_BOOTSTRAP_ADMIN_PASSWORD`.
async fn bootstrap_memory_admin(state: &AppState) -> Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("SR_BOOTSTRAP_ADMIN_EMAIL"),
        std::env::var("SR_BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        warn!("No bootstrap admin configured; admin routes are unusable");
        return Ok(());
    };

    AuthService::provision_admin(state, &email, &password)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to provision bootstrap admin: {}", e))?;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

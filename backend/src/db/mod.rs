//! PostgreSQL pool, migrations and the readiness query

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

fn connect_options(database_url: &str) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(database_url)
        .context("Invalid database URL")?
        .application_name("student-records");
    Ok(options)
}

/// Connect a pool of at most `max_connections`
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options(database_url)?)
        .await
        .context("Failed to connect to the record store")?;

    info!(max_connections, "Database pool created");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// `SELECT 1` against the pool
pub async fn health_check(pool: &PgPool) -> sqlx::Result<()> {
    if let Err(err) = sqlx::query("SELECT 1").execute(pool).await {
        warn!(error = %err, "Database health check failed");
        return Err(err);
    }
    Ok(())
}

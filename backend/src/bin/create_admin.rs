//! One-time admin provisioning
//!
//! ```text
//! create-admin --email admin@school.test
//! ```
//!
//! The password comes from `--password` or `SR_ADMIN_PASSWORD`. Refuses to
//! run once an admin account exists.

use anyhow::Result;
use clap::Parser;
use student_records_backend::{
    config::AppConfig, db, services::AuthService, state::AppState, telemetry,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "create-admin", about = "Provision the admin account", version)]
struct Args {
    /// Admin login email
    #[arg(long)]
    email: String,

    /// Admin password (8 characters to 72 bytes)
    #[arg(long, env = "SR_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    /// Skip running pending migrations first
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let args = Args::parse();
    let config = AppConfig::load()?;
    config.validate(AppConfig::is_production())?;

    if config.database.is_in_memory() {
        anyhow::bail!(
            "database.url selects the in-memory store; set SR_BOOTSTRAP_ADMIN_EMAIL and \
             SR_BOOTSTRAP_ADMIN_PASSWORD for the server instead"
        );
    }

    let pool = db::create_pool(&config.database.url, 2).await?;
    if !args.skip_migrations {
        db::run_migrations(&pool).await?;
    }

    let state = AppState::with_postgres(pool, config);
    let admin = AuthService::provision_admin(&state, &args.email, &args.password)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!(admin_id = %admin.id, "Admin account created");
    println!("Created admin {}", admin.id);
    Ok(())
}

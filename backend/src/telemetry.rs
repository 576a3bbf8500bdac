//! Logging and metrics setup shared by the binaries

use crate::config::AppConfig;
use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// JSON output in production, pretty output otherwise. `RUST_LOG`
/// overrides the default filter.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "student_records_backend=info,tower_http=info".into()
        } else {
            "student_records_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Install the global Prometheus recorder and return its render handle
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "auth_login_attempts_total",
        "Login attempts by role and outcome"
    );
    metrics::describe_counter!(
        "auth_gate_rejections_total",
        "Requests rejected by the authorization gate, by reason"
    );
    metrics::describe_counter!("auth_registrations_total", "Successful student registrations");

    Ok(handle)
}

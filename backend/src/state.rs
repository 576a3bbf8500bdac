//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction. Everything in it
//! is either `Arc`'d or cheap to clone, and read-only once built.

use crate::auth::{JwtService, PasswordService, PrincipalResolver};
use crate::config::AppConfig;
use crate::repositories::{
    AdminStore, MemoryAdminStore, MemoryStudentStore, PgAdminStore, PgStudentStore, StudentStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Student credential records
    pub students: Arc<dyn StudentStore>,
    /// Admin credential records
    pub admins: Arc<dyn AdminStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    pub passwords: PasswordService,
    pub resolver: PrincipalResolver,
    /// Prometheus render handle; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state over the given record stores
    ///
    /// Derives the JWT keys from the config secret, so call once at startup.
    pub fn new(
        students: Arc<dyn StudentStore>,
        admins: Arc<dyn AdminStore>,
        config: AppConfig,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt.secret);
        let passwords = PasswordService::new(&config.password);
        let resolver = PrincipalResolver::new(students.clone());

        Self {
            students,
            admins,
            config: Arc::new(config),
            jwt,
            passwords,
            resolver,
            metrics: None,
        }
    }

    /// State backed by PostgreSQL
    pub fn with_postgres(pool: PgPool, config: AppConfig) -> Self {
        Self::new(
            Arc::new(PgStudentStore::new(pool.clone())),
            Arc::new(PgAdminStore::new(pool)),
            config,
        )
    }

    /// State backed by empty in-memory stores
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            Arc::new(MemoryStudentStore::new()),
            Arc::new(MemoryAdminStore::new()),
            config,
        )
    }

    /// Expose the given recorder on `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[inline]
    pub fn students(&self) -> &dyn StudentStore {
        self.students.as_ref()
    }

    #[inline]
    pub fn admins(&self) -> &dyn AdminStore {
        self.admins.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    #[inline]
    pub fn resolver(&self) -> &PrincipalResolver {
        &self.resolver
    }
}

//! PostgreSQL admin store

use super::student::map_unique_violation;
use super::{AdminRecord, AdminStore, StoreError};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Admin store backed by the `admins` table
#[derive(Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn create_first(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, StoreError> {
        // admins_singleton_key rejects a concurrent insert that passed the NOT EXISTS check
        let record = sqlx::query_as::<_, AdminRecord>(
            r#"
            INSERT INTO admins (email, password_hash)
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM admins)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        record.ok_or(StoreError::Duplicate("admin"))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
        let record = sqlx::query_as::<_, AdminRecord>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError> {
        let record = sqlx::query_as::<_, AdminRecord>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

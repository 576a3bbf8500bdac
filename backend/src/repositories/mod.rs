//! Record store
//!
//! Credential records live behind the [`StudentStore`] and [`AdminStore`]
//! traits. PostgreSQL backs production; the in-memory implementation backs
//! tests and `memory:` development runs. Both enforce email uniqueness
//! atomically and report a clash as [`StoreError::Duplicate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use student_records_shared::StudentProfile;
use thiserror::Error;
use uuid::Uuid;

pub mod admin;
pub mod memory;
pub mod student;

pub use admin::PgAdminStore;
pub use memory::{MemoryAdminStore, MemoryStudentStore};
pub use student::PgStudentStore;

/// Record store failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique field (email, admission number) is already taken, or
    /// `"admin"` when the single admin slot is filled
    #[error("Duplicate value for unique field {0}")]
    Duplicate(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Student credential record as persisted
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    #[sqlx(rename = "class_level")]
    pub class: i32,
    pub admission_number: String,
    pub email: String,
    pub password_hash: String,
    pub profile_pic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// Public projection; drops the password hash
    pub fn to_profile(&self) -> StudentProfile {
        StudentProfile {
            id: self.id,
            name: self.name.clone(),
            age: self.age,
            class: self.class,
            admission_number: self.admission_number.clone(),
            email: self.email.clone(),
            profile_pic: self.profile_pic.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a student record
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub age: i32,
    pub class: i32,
    pub admission_number: String,
    pub email: String,
    pub password_hash: String,
    pub profile_pic: String,
}

/// Admin credential record as persisted
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AdminRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Student record store
#[async_trait]
pub trait StudentStore: Send + Sync + 'static {
    /// Insert a new record; `Duplicate` if email or admission number is taken
    async fn create(&self, student: NewStudent) -> Result<StudentRecord, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<StudentRecord>, StoreError>;

    /// Persist every mutable field of `student`. `None` if the record is gone.
    async fn save(&self, student: &StudentRecord) -> Result<Option<StudentRecord>, StoreError>;

    /// Returns `true` if a record was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Case-insensitive substring search over name, email and admission
    /// number, oldest first. `None` or a blank query lists everything.
    async fn search(&self, query: Option<&str>) -> Result<Vec<StudentRecord>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Admin record store
#[async_trait]
pub trait AdminStore: Send + Sync + 'static {
    /// Insert the admin record unless one already exists.
    /// `Duplicate("admin")` once any admin is present.
    async fn create_first(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Trim a search query, treating blank input as "no filter"
pub(crate) fn normalize_query(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

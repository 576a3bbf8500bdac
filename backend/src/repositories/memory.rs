//! In-memory record stores for tests and single-process development runs.
//!
//! Each store keeps records in insertion order behind a Tokio `RwLock`;
//! uniqueness checks and the write happen under the same guard.

use super::{
    normalize_query, AdminRecord, AdminStore, NewStudent, StoreError, StudentRecord, StudentStore,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory student store
#[derive(Debug, Clone, Default)]
pub struct MemoryStudentStore {
    records: Arc<RwLock<Vec<StudentRecord>>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Unique field already taken by any record other than `skip`
fn conflicting_field(
    records: &[StudentRecord],
    email: &str,
    admission_number: &str,
    skip: Option<Uuid>,
) -> Option<&'static str> {
    let others = records.iter().filter(|r| Some(r.id) != skip);
    for record in others {
        if record.email == email {
            return Some("email");
        }
        if record.admission_number == admission_number {
            return Some("admission_number");
        }
    }
    None
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn create(&self, student: NewStudent) -> Result<StudentRecord, StoreError> {
        let mut records = self.records.write().await;

        if let Some(field) =
            conflicting_field(&records, &student.email, &student.admission_number, None)
        {
            return Err(StoreError::Duplicate(field));
        }

        let now = Utc::now();
        let record = StudentRecord {
            id: Uuid::new_v4(),
            name: student.name,
            age: student.age,
            class: student.class,
            admission_number: student.admission_number,
            email: student.email,
            password_hash: student.password_hash,
            profile_pic: student.profile_pic,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StudentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.email == email).cloned())
    }

    async fn save(&self, student: &StudentRecord) -> Result<Option<StudentRecord>, StoreError> {
        let mut records = self.records.write().await;

        if let Some(field) = conflicting_field(
            &records,
            &student.email,
            &student.admission_number,
            Some(student.id),
        ) {
            return Err(StoreError::Duplicate(field));
        }

        let Some(existing) = records.iter_mut().find(|r| r.id == student.id) else {
            return Ok(None);
        };

        // id and created_at are immutable
        existing.name = student.name.clone();
        existing.age = student.age;
        existing.class = student.class;
        existing.admission_number = student.admission_number.clone();
        existing.email = student.email.clone();
        existing.password_hash = student.password_hash.clone();
        existing.profile_pic = student.profile_pic.clone();
        existing.updated_at = Utc::now();

        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn search(&self, query: Option<&str>) -> Result<Vec<StudentRecord>, StoreError> {
        let records = self.records.read().await;
        let matches = match normalize_query(query) {
            Some(term) => records
                .iter()
                .filter(|r| {
                    r.name.to_lowercase().contains(&term)
                        || r.email.to_lowercase().contains(&term)
                        || r.admission_number.to_lowercase().contains(&term)
                })
                .cloned()
                .collect(),
            None => records.clone(),
        };
        Ok(matches)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory admin store
#[derive(Debug, Clone, Default)]
pub struct MemoryAdminStore {
    records: Arc<RwLock<Vec<AdminRecord>>>,
}

impl MemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn create_first(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminRecord, StoreError> {
        let mut records = self.records.write().await;

        if !records.is_empty() {
            return Err(StoreError::Duplicate("admin"));
        }

        let record = AdminRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        records.push(record.clone());

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}

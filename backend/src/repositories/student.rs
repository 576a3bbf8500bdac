//! PostgreSQL student store

use super::{normalize_query, NewStudent, StoreError, StudentRecord, StudentStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const STUDENT_COLUMNS: &str = "id, name, age, class_level, admission_number, email, \
                               password_hash, profile_pic, created_at, updated_at";

/// Student store backed by the `students` table
#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate a unique violation into `Duplicate` using the constraint name
pub(crate) fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(name) if name.contains("admission_number") => "admission_number",
                Some(name) if name.contains("singleton") => "admin",
                _ => "email",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(err)
}

/// Escape LIKE metacharacters and wrap for substring matching
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn create(&self, student: NewStudent) -> Result<StudentRecord, StoreError> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            r#"
            INSERT INTO students (name, age, class_level, admission_number, email, password_hash, profile_pic)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(&student.name)
        .bind(student.age)
        .bind(student.class)
        .bind(&student.admission_number)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(&student.profile_pic)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentRecord>, StoreError> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StudentRecord>, StoreError> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            "SELECT {} FROM students WHERE email = $1",
            STUDENT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn save(&self, student: &StudentRecord) -> Result<Option<StudentRecord>, StoreError> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            r#"
            UPDATE students SET
                name = $2,
                age = $3,
                class_level = $4,
                admission_number = $5,
                email = $6,
                password_hash = $7,
                profile_pic = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(student.id)
        .bind(&student.name)
        .bind(student.age)
        .bind(student.class)
        .bind(&student.admission_number)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(&student.profile_pic)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: Option<&str>) -> Result<Vec<StudentRecord>, StoreError> {
        let records = match normalize_query(query) {
            Some(term) => {
                sqlx::query_as::<_, StudentRecord>(&format!(
                    r#"
                    SELECT {} FROM students
                    WHERE name ILIKE $1 OR email ILIKE $1 OR admission_number ILIKE $1
                    ORDER BY created_at, id
                    "#,
                    STUDENT_COLUMNS
                ))
                .bind(like_pattern(&term))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StudentRecord>(&format!(
                    "SELECT {} FROM students ORDER BY created_at, id",
                    STUDENT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::db::health_check(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ali"), "%ali%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_non_database_error_passes_through() {
        let err = map_unique_violation(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}

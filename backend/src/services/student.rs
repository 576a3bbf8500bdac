//! Student record management
//!
//! Shared by self-service registration, the student profile routes and the
//! admin student routes. Passwords are hashed on the blocking thread pool
//! before they reach the record store.

use crate::error::{duplicate_label, ApiError, ApiResult};
use crate::repositories::{NewStudent, StoreError, StudentRecord};
use crate::state::AppState;
use student_records_shared::validation::{validate_registration, validate_update};
use student_records_shared::{AuthError, RegisterRequest, StudentProfile, UpdateStudentRequest};
use tracing::info;
use uuid::Uuid;

/// Canonical form of an email address as stored and looked up
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Student service for record operations
pub struct StudentService;

impl StudentService {
    pub async fn get(state: &AppState, id: Uuid) -> ApiResult<StudentProfile> {
        let record = Self::find(state, id).await?;
        Ok(record.to_profile())
    }

    /// List students, optionally filtered by a name/email/admission number query
    pub async fn list(state: &AppState, search: Option<&str>) -> ApiResult<Vec<StudentProfile>> {
        let records = state.students().search(search).await?;
        Ok(records.iter().map(StudentRecord::to_profile).collect())
    }

    pub async fn create(state: &AppState, req: RegisterRequest) -> ApiResult<StudentProfile> {
        let record = Self::create_record(state, req).await?;
        Ok(record.to_profile())
    }

    /// Validate, hash and persist a new student
    ///
    /// A taken email or admission number is `AlreadyExists`, whether it is
    /// caught by the lookup or by the store's uniqueness constraint.
    pub(crate) async fn create_record(
        state: &AppState,
        mut req: RegisterRequest,
    ) -> ApiResult<StudentRecord> {
        req.email = normalize_email(&req.email);
        validate_registration(&req)?;

        if state.students().find_by_email(&req.email).await?.is_some() {
            return Err(AuthError::AlreadyExists("Email".to_string()).into());
        }

        let password_hash = state.passwords().hash_async(req.password).await?;

        let record = state
            .students()
            .create(NewStudent {
                name: req.name.trim().to_string(),
                age: req.age,
                class: req.class,
                admission_number: req.admission_number.trim().to_string(),
                email: req.email,
                password_hash,
                profile_pic: req.profile_pic.unwrap_or_default(),
            })
            .await
            .map_err(already_exists)?;

        info!(student_id = %record.id, "Student record created");
        Ok(record)
    }

    /// Apply a partial update; a new password is re-hashed
    pub async fn update(
        state: &AppState,
        id: Uuid,
        mut req: UpdateStudentRequest,
    ) -> ApiResult<StudentProfile> {
        if let Some(email) = req.email.as_mut() {
            *email = normalize_email(email);
        }
        validate_update(&req)?;

        let mut record = Self::find(state, id).await?;

        if let Some(name) = req.name {
            record.name = name.trim().to_string();
        }
        if let Some(age) = req.age {
            record.age = age;
        }
        if let Some(class) = req.class {
            record.class = class;
        }
        if let Some(admission_number) = req.admission_number {
            record.admission_number = admission_number.trim().to_string();
        }
        if let Some(email) = req.email {
            record.email = email;
        }
        if let Some(profile_pic) = req.profile_pic {
            record.profile_pic = profile_pic;
        }
        if let Some(password) = req.password {
            record.password_hash = state.passwords().hash_async(password).await?;
        }

        let saved = state
            .students()
            .save(&record)
            .await?
            .ok_or_else(student_not_found)?;

        Ok(saved.to_profile())
    }

    pub async fn delete(state: &AppState, id: Uuid) -> ApiResult<()> {
        if !state.students().delete(id).await? {
            return Err(student_not_found());
        }

        info!(student_id = %id, "Student record deleted");
        Ok(())
    }

    async fn find(state: &AppState, id: Uuid) -> ApiResult<StudentRecord> {
        state
            .students()
            .find_by_id(id)
            .await?
            .ok_or_else(student_not_found)
    }
}

fn student_not_found() -> ApiError {
    ApiError::NotFound("Student not found".to_string())
}

fn already_exists(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate(field) => {
            AuthError::AlreadyExists(duplicate_label(field).to_string()).into()
        }
        other => other.into(),
    }
}

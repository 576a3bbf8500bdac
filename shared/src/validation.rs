//! Input validation functions
//!
//! Server-side checks applied before anything is hashed or persisted.

use crate::errors::ValidationError;
use crate::types::{RegisterRequest, UpdateStudentRequest};
use validator::ValidateEmail;

pub const PASSWORD_MIN_LEN: usize = 8;
/// bcrypt only reads the first 72 bytes of its input
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::new("email", "Email cannot be empty"));
    }
    if email.len() > 255 {
        return Err(ValidationError::new("email", "Email too long"));
    }
    if !email.validate_email() {
        return Err(ValidationError::new("email", "Invalid email format"));
    }
    Ok(())
}

/// Validate password length bounds
///
/// The lower bound counts characters, the upper bound counts UTF-8 bytes.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
        ));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at most {} bytes", PASSWORD_MAX_BYTES),
        ));
    }
    Ok(())
}

fn validate_non_empty(field: &'static str, value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{} cannot be empty", label)));
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: i32, label: &str) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(field, format!("{} must be positive", label)));
    }
    Ok(())
}

/// Validate a full registration / creation payload
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
    validate_non_empty("name", &req.name, "Name")?;
    validate_positive("age", req.age, "Age")?;
    validate_positive("class", req.class, "Class")?;
    validate_non_empty("admission_number", &req.admission_number, "Admission number")?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    Ok(())
}

/// Validate only the fields present in a partial update
pub fn validate_update(req: &UpdateStudentRequest) -> Result<(), ValidationError> {
    if let Some(name) = &req.name {
        validate_non_empty("name", name, "Name")?;
    }
    if let Some(age) = req.age {
        validate_positive("age", age, "Age")?;
    }
    if let Some(class) = req.class {
        validate_positive("class", class, "Class")?;
    }
    if let Some(admission_number) = &req.admission_number {
        validate_non_empty("admission_number", admission_number, "Admission number")?;
    }
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    if let Some(password) = &req.password {
        validate_password(password)?;
    }
    Ok(())
}

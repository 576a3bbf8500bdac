//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Authentication
// ============================================================================

/// Login request (students and admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Student registration request, also used by admins creating a student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub age: i32,
    pub class: i32,
    pub admission_number: String,
    pub email: String,
    pub password: String,
    /// Reference returned by the file store for an uploaded picture
    #[serde(default)]
    pub profile_pic: Option<String>,
}

/// Issued token plus the student's public projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub student: StudentProfile,
}

/// Issued token plus the admin's public projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub admin: AdminProfile,
}

// ============================================================================
// Student records
// ============================================================================

/// Public projection of a student record. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub class: i32,
    pub admission_number: String,
    pub email: String,
    pub profile_pic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of the admin record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Partial update of a student record; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub class: Option<i32>,
    #[serde(default)]
    pub admission_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// New plaintext password; re-hashed before it is stored
    #[serde(default)]
    pub password: Option<String>,
}

/// Query parameters for the admin student listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentSearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

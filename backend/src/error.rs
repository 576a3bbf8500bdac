//! Application error handling
//!
//! Converts internal errors to HTTP responses. Client-facing messages are
//! fixed per error kind; store and internal failures are logged here with
//! full detail and surfaced generically.

use crate::repositories::StoreError;
use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use student_records_shared::{AuthError, ErrorDetail, ErrorResponse, ValidationError};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// The authentication error carried by this error, if any
    pub fn auth_error(&self) -> Option<&AuthError> {
        match self {
            ApiError::Auth(e) => Some(e),
            _ => None,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.message.clone(),
                Some(e.field.to_string()),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Auth(e) => match e {
                AuthError::InvalidCredentials => invalid_credentials(),
                AuthError::CorruptCredential => {
                    error!("Stored credential failed to parse during login");
                    invalid_credentials()
                }
                AuthError::AlreadyExists(_) => {
                    (StatusCode::CONFLICT, "CONFLICT", e.to_string(), None)
                }
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string(), None),
                AuthError::MissingToken
                | AuthError::MalformedHeader
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::NotFound => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", e.to_string(), None)
                }
            },
            ApiError::Store(StoreError::Duplicate(field)) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("{} already exists", duplicate_label(field)),
                Some(field.to_string()),
            ),
            ApiError::Store(StoreError::Database(err)) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

fn invalid_credentials() -> (StatusCode, &'static str, String, Option<String>) {
    (
        StatusCode::UNAUTHORIZED,
        "INVALID_CREDENTIALS",
        AuthError::InvalidCredentials.to_string(),
        None,
    )
}

pub(crate) fn duplicate_label(field: &str) -> &'static str {
    match field {
        "admission_number" => "Admission number",
        "admin" => "Admin",
        _ => "Email",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = self.parts();

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        let mut response = (status, body).into_response();
        if code == "UNAUTHENTICATED" {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! Error types for the Student Records application

use thiserror::Error;

/// Authentication and authorization failures.
///
/// The `Display` strings are client-safe: they never carry record-store
/// detail and the login failure is identical whichever check rejected it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password at login
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration with an email (or admission number) that is taken
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Missing authorization header")]
    MissingToken,

    #[error("Invalid authorization format")]
    MalformedHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Authenticated, but the token's role does not grant access
    #[error("Access denied for this role")]
    Forbidden,

    /// The token's subject no longer has a credential record
    #[error("Account no longer exists")]
    NotFound,

    /// Stored hash is not in a recognised format
    #[error("Stored credential is corrupt")]
    CorruptCredential,
}

impl AuthError {
    /// True for every failure that means "no usable credential was presented".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::MalformedHeader
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::NotFound
        )
    }

    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AlreadyExists(_) => "already_exists",
            AuthError::MissingToken => "missing_token",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::Forbidden => "forbidden",
            AuthError::NotFound => "principal_not_found",
            AuthError::CorruptCredential => "corrupt_credential",
        }
    }
}

/// Input validation failure for a single field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_classification() {
        assert!(AuthError::MissingToken.is_unauthenticated());
        assert!(AuthError::TokenExpired.is_unauthenticated());
        assert!(AuthError::NotFound.is_unauthenticated());
        assert!(!AuthError::Forbidden.is_unauthenticated());
        assert!(!AuthError::InvalidCredentials.is_unauthenticated());
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}

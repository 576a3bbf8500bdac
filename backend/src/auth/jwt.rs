//! JWT issuance and verification
//!
//! Tokens are HS256-signed with the process-wide secret handed to
//! [`JwtService::new`]. The codec carries the role claim faithfully but
//! never interprets it; role enforcement lives in the gate.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use student_records_shared::{AuthError, Role};
use uuid::Uuid;

/// Principal claims chosen by the caller of [`JwtService::issue`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (student or admin record ID)
    pub sub: String,
    /// Role marker; student tokens omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Claims for a student token: subject only
    pub fn student(id: Uuid) -> Self {
        Self {
            sub: id.to_string(),
            role: None,
            email: None,
        }
    }

    /// Claims for an admin token: subject, admin role and email
    pub fn admin(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            sub: id.to_string(),
            role: Some(Role::Admin),
            email: Some(email.into()),
        }
    }
}

/// Full token payload: principal claims plus validity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub claims: Claims,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Parse the subject as a record ID
    pub fn subject_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Role asserted by the token; a missing role claim means student
    pub fn role(&self) -> Role {
        self.claims.role.unwrap_or(Role::Student)
    }
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Keys are derived once and shared behind `Arc`, so cloning is O(1).
/// Separate instances built from different secrets reject each other's
/// tokens.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    validation: Arc<Validation>,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            keys: JwtKeys::new(secret),
            validation: Arc::new(validation),
        }
    }

    /// Sign `claims` with an expiry of now + `ttl`
    #[inline]
    pub fn issue(&self, claims: Claims, ttl: Duration) -> Result<String> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Sign `claims` as if issued at `now`
    pub fn issue_at(&self, claims: Claims, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
        let payload = TokenClaims {
            claims,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Verify signature, then expiry, against the current time
    #[inline]
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, then expiry, against `now`
    ///
    /// Any structural or signature failure is `InvalidToken`; a correctly
    /// signed token is `TokenExpired` once `now` passes `exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, self.keys.decoding(), &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;

        if now.timestamp() > data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }
}

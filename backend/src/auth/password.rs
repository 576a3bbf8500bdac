//! Password hashing with bcrypt (default) or argon2
//!
//! New hashes use the configured algorithm; verification recognises both
//! formats by their PHC/modular-crypt prefix so the algorithm can be
//! switched without invalidating stored credentials.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. Async callers should
//! use the `*_async` variants, which run on the blocking thread pool.

use crate::config::{HashAlgorithm, PasswordConfig};
use crate::error::{ApiError, ApiResult};
use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::{Arc, OnceLock};
use student_records_shared::validation::PASSWORD_MAX_BYTES;
use student_records_shared::AuthError;

/// Password hashing service
///
/// Cheap to clone; the work factor is fixed at construction.
#[derive(Clone)]
pub struct PasswordService {
    algorithm: HashAlgorithm,
    bcrypt_cost: u32,
    /// Hash verified against when the account does not exist, so both
    /// login failure branches cost one verification.
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordService {
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            bcrypt_cost: config.bcrypt_cost,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// bcrypt refuses input longer than [`PASSWORD_MAX_BYTES`] rather than
    /// silently truncating it.
    pub fn hash(&self, password: &str) -> Result<String> {
        match self.algorithm {
            HashAlgorithm::Bcrypt => {
                if password.len() > PASSWORD_MAX_BYTES {
                    anyhow::bail!("Password exceeds {} bytes", PASSWORD_MAX_BYTES);
                }
                bcrypt::hash(password, self.bcrypt_cost)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
            }
            HashAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
                Ok(hash.to_string())
            }
        }
    }

    /// Verify a password against a stored digest (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch. Only a digest that cannot be parsed
    /// yields `CorruptCredential`.
    pub fn verify(password: &str, digest: &str) -> Result<bool, AuthError> {
        if digest.starts_with("$argon2") {
            let parsed = PasswordHash::new(digest).map_err(|_| AuthError::CorruptCredential)?;
            return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(_) => Err(AuthError::CorruptCredential),
            };
        }

        if digest.starts_with("$2") {
            let matched =
                bcrypt::verify(password, digest).map_err(|_| AuthError::CorruptCredential)?;
            // bcrypt ignores everything past 72 bytes
            return Ok(matched && password.len() <= PASSWORD_MAX_BYTES);
        }

        Err(AuthError::CorruptCredential)
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(&self, password: String, digest: String) -> ApiResult<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &digest))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Task join error: {}", e)))?
            .map_err(ApiError::from)
    }

    /// Spend one verification's worth of work and discard the result.
    pub async fn verify_dummy_async(&self, password: String) {
        let service = self.clone();
        let _ = tokio::task::spawn_blocking(move || {
            let digest = service
                .dummy_hash
                .get_or_init(|| service.hash("placeholder-password").unwrap_or_default());
            let _ = Self::verify(&password, digest);
        })
        .await;
    }
}

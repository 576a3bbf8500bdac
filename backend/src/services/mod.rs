//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the record stores, the password hasher and the token codec.

pub mod auth;
pub mod student;

pub use auth::AuthService;
pub use student::{normalize_email, StudentService};

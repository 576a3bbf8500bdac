//! Student Records Backend Library
//!
//! Authentication and authorization core of the student records service,
//! exposed for the binaries and integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

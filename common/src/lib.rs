//! Shared building blocks for the db-setup workspace.
//!
//! - Environment-backed configuration, resolved once at startup
//! - The common error type
//! - Tracing initialization

pub mod config;
pub mod errors;
pub mod telemetry;

pub use config::{ConnectionTarget, DatabaseConfig, EnvSource, SupabaseConfig};
pub use errors::{AppError, AppResult};

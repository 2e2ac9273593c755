//! Monitoring error types

use thiserror::Error;

/// Monitoring result type
pub type Result<T> = std::result::Result<T, MonitoringError>;

/// Monitoring errors
#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("unknown environment: {0} (expected development, staging, production, or clinical)")]
    UnknownEnvironment(String),
}

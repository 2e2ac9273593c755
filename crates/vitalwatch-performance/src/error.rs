//! Performance validation error types

use std::path::PathBuf;
use thiserror::Error;

/// Performance result type
pub type Result<T> = std::result::Result<T, PerformanceError>;

/// Performance validation errors
///
/// Budget breaches and regressions are structured output, never errors;
/// only I/O on the baseline, metrics, and report files lands here.
#[derive(Debug, Error)]
pub enum PerformanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("baseline file not found: {0}")]
    BaselineNotFound(PathBuf),

    #[error("baseline file unreadable: {path}: {source}")]
    BaselineCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("metrics file unreadable: {path}: {source}")]
    MetricsUnreadable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

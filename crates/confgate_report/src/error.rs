//! Error types for report rendering.

use thiserror::Error;

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur while rendering a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

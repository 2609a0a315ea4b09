//! Error types for policy module.

use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur while loading or resolving policies.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Policy {0} doesn't exist")]
    PolicyNotFound(String),

    #[error("Rule {0} is not custom nor default")]
    UnknownRule(String),

    #[error("Identifier {0} is used by more than one custom rule")]
    DuplicateIdentifier(String),

    #[error("Custom rule {0} has the identifier of a default rule")]
    DefaultRuleIdentifier(String),

    #[error("Rule {identifier} appears more than once in policy {policy}")]
    DuplicateRuleInPolicy { policy: String, identifier: String },

    #[error("Custom rule {0} has no schema")]
    MissingSchema(String),

    #[error("Invalid policy configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

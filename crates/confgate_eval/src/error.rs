//! Error types for the evaluation engine.

use thiserror::Error;

/// Result type alias for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that abort an evaluation run.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid schema for rule {rule}: {message}")]
    InvalidSchema { rule: String, message: String },

    #[error("Failed to evaluate rule {rule}: {message}")]
    Predicate { rule: String, message: String },
}

impl EvalError {
    pub fn invalid_schema(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn predicate(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Predicate {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

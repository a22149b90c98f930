//! Domain errors raised by the pure workflow rules

use thiserror::Error;

/// Errors produced while validating input or applying a workflow transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Insufficient stock for {item_code}: requested {requested}, available {available}")]
    InsufficientStock {
        item_code: String,
        requested: i64,
        available: i64,
    },

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Shorthand for a field validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing required field
    pub fn missing(field: &str) -> Self {
        Self::validation(field, "is required")
    }
}

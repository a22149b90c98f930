//! Error handling for the Stockyard server
//!
//! Every failure leaves the API as `{"error", "code", "details"?}`. Store
//! failures are logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use shared::DomainError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock for {item_code}")]
    InsufficientStock {
        item_code: String,
        requested: i64,
        available: i64,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Validation failure tied to one input field
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::Validation { .. }
            | AppError::InvalidRole(_)
            | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidStateTransition(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidRole(_) => "INVALID_ROLE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing body; internal failures never carry their cause
    pub fn to_body(&self) -> ErrorResponse {
        let (error, details) = match self {
            AppError::Unauthorized(msg) => (msg.clone(), None),
            AppError::InsufficientPermissions => (
                "You do not have permission to perform this action".to_string(),
                None,
            ),
            AppError::Validation { field, message } => (
                match field {
                    Some(field) => format!("{}: {}", field, message),
                    None => message.clone(),
                },
                field.as_ref().map(|f| json!({ "field": f })),
            ),
            AppError::InvalidRole(role) => (
                format!("Invalid role '{}': expected driver or siteworker", role),
                None,
            ),
            AppError::NotFound(resource) => (format!("{} not found", resource), None),
            AppError::InvalidStateTransition(msg) => (msg.clone(), None),
            AppError::InsufficientStock {
                item_code,
                requested,
                available,
            } => (
                format!("Insufficient stock for item {}", item_code),
                Some(json!({
                    "item_code": item_code,
                    "requested": requested,
                    "available": available,
                })),
            ),
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::InternalError(_) => {
                ("An internal server error occurred".to_string(), None)
            }
        };

        ErrorResponse {
            error,
            code: self.code().to_string(),
            details,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => AppError::Validation {
                field: Some(field),
                message,
            },
            DomainError::InvalidRole(role) => AppError::InvalidRole(role),
            DomainError::InsufficientStock {
                item_code,
                requested,
                available,
            } => AppError::InsufficientStock {
                item_code,
                requested,
                available,
            },
            DomainError::InvalidTransition { from, to } => AppError::InvalidStateTransition(
                format!("Cannot move from {} to {}", from, to),
            ),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().copied().collect();
        fields.sort_unstable();

        match fields.first() {
            Some(&field) => {
                let message = field_errors[field]
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                AppError::validation(field, message)
            }
            None => AppError::Validation {
                field: None,
                message: errors.to_string(),
            },
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(self.to_body())).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

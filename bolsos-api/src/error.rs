//! Error types for bolsos-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input failed a field constraint (422)
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Requested bag does not exist (404)
    #[error("Bag {0} not found")]
    NotFound(u64),

    /// Storage read or write failed (500)
    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Invariant violated, e.g. a row vanished between check and write (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Storage { .. } => "STORAGE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<bolsos_common::Error> for ApiError {
    fn from(err: bolsos_common::Error) -> Self {
        match err.operation() {
            Some(operation) => ApiError::Storage {
                operation,
                message: err.to_string(),
            },
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Responding with server error");
        }

        let body = match &self {
            ApiError::Validation { field, reason } => json!({
                "error": {
                    "code": self.error_code(),
                    "message": format!("Invalid {}: {}", field, reason),
                    "field": field,
                }
            }),
            // Driver details stay in the log
            ApiError::Storage { operation, .. } => json!({
                "error": {
                    "code": self.error_code(),
                    "message": format!("Database operation failed ({})", operation),
                }
            }),
            _ => json!({
                "error": {
                    "code": self.error_code(),
                    "message": self.to_string(),
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

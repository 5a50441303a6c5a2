//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": "..."}`; validation failures add a
//! `details` object with the offending fields.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;
use validator::ValidationErrors;

use crate::storage::StorageError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    /// Field-level validation failure (400)
    Validation(Value),

    #[error("{0}")]
    /// Malformed or incomplete request (400)
    BadRequest(String),

    #[error("{0}")]
    /// Unknown resource (404)
    NotFound(String),

    #[error("{0}")]
    /// Request conflicts with the current state (409)
    Conflict(String),

    #[error("Internal server error: {0}")]
    /// Anything else (500); the detail is logged, never returned
    Internal(String),
}

impl AppError {
    pub fn order_not_found() -> Self {
        Self::NotFound("Order not found".to_string())
    }

    pub fn product_not_found() -> Self {
        Self::NotFound("Product not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(details) => json!({ "error": "Validation failed", "details": details }),
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(serde_json::to_value(&errors).unwrap_or(Value::Null))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidTransition(t) => AppError::Conflict(t.to_string()),
            StorageError::Invalid(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

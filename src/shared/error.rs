//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::ValidationError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Payload is not structurally valid for the document shape
    #[error("Malformed document: {0}")]
    Decode(String),

    /// A field rule was violated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A document references something that does not exist in its room
    #[error("{0}")]
    Relation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Signing secret unavailable: {0}")]
    Provisioning(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl AppError {
    /// Short machine-readable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Decode(_) => "decode",
            AppError::Validation(_) => "validation",
            AppError::Relation(_) => "relation",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Provisioning(_) => "provisioning",
            AppError::Internal(_) => "internal",
            AppError::Database(_) => "database",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Decode(_) => (StatusCode::BAD_REQUEST, 10001, self.to_string()),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, 10002, e.to_string()),
            AppError::Relation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, 10003, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10004, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10005, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10006, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, 10007, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10008, msg.clone()),
            AppError::Provisioning(msg) => {
                tracing::error!("Provisioning error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}

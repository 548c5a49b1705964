//! Application error type mapping to HTTP status codes.
//!
//! The response body is always `{"error": "<human-readable message>"}`; there
//! are no structured error codes beyond the status itself.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use keepsake_types::error::{CompanionError, StoreError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Bad request payload.
    Validation(String),
    /// Companion service failure (backend, store, merge).
    Companion(CompanionError),
    /// Direct store failure from a document handler.
    Store(StoreError),
    /// Generic internal error.
    Internal(String),
}

impl From<CompanionError> for AppError {
    fn from(e: CompanionError) -> Self {
        AppError::Companion(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Companion(CompanionError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "No message provided".to_string())
            }
            AppError::Companion(CompanionError::Backend(e)) => (
                StatusCode::BAD_GATEWAY,
                format!("generative backend error: {e}"),
            ),
            AppError::Companion(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = json!({ "error": message });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

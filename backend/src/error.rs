// src/error.rs

use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::tracker::error::ProgressError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., answering the wrong checkpoint)
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 503 Service Unavailable (retryable)
    ServiceUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service Unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable, please retry".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps tracker errors onto HTTP semantics.
impl From<ProgressError> for AppError {
    fn from(err: ProgressError) -> Self {
        let msg = err.to_string();
        match err {
            ProgressError::UnknownTeam(_) | ProgressError::UnknownQuestion(_) => {
                AppError::NotFound(msg)
            }
            ProgressError::WrongCheckpoint { .. } | ProgressError::RouteComplete => {
                AppError::Conflict(msg)
            }
            ProgressError::MissingEvidence | ProgressError::InvalidRecord(_) => {
                AppError::BadRequest(msg)
            }
            ProgressError::PayloadTooLarge(_) => AppError::PayloadTooLarge(msg),
            ProgressError::StoreUnavailable(_) => AppError::ServiceUnavailable(msg),
        }
    }
}

/// Any JSON body axum cannot extract (wrong content type, syntax, missing
/// fields) is a 400 with the usual error body.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Body-limit violations surface as 413, anything else is a malformed form.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}

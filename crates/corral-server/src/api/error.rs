//! API error type and the mapping from domain errors to HTTP responses.
//!
//! Every error body has the shape `{"error": <message>, "code": <code>}`.
//! Client errors carry the domain message; server faults are logged and
//! answered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use corral_core::error::CorralError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                code: code.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn api_bad_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "malformed_payload", message)
}

pub fn api_not_found(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

impl From<CorralError> for ApiError {
    fn from(err: CorralError) -> Self {
        match err {
            CorralError::Validation { kind, message } => {
                ApiError::new(StatusCode::BAD_REQUEST, kind.code(), message)
            }
            CorralError::AlreadyExists { entity, id } => ApiError::new(
                StatusCode::CONFLICT,
                "already_exists",
                format!("{} '{id}' already exists.", capitalize(&entity)),
            ),
            CorralError::NotFound { entity, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} '{id}' not found.", capitalize(&entity)),
            ),
            CorralError::Gone { message } => ApiError::new(StatusCode::GONE, "gone", message),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error",
                )
            }
        }
    }
}

/// `reindex_job` -> `Reindex job`.
fn capitalize(entity: &str) -> String {
    let spaced = entity.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

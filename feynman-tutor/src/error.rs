//! Error types for feynman-tutor
//!
//! Three layers:
//! - [`LlmError`](crate::services::LlmError): transport/model failures (services)
//! - [`TutorError`]: outcome of an ingestion or review operation
//! - [`ApiError`]: HTTP mapping with a JSON error body

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a core tutor operation
///
/// Only `Storage` is fatal in the operational sense: every model-related
/// failure is either degraded internally or surfaced as
/// `UpstreamUnavailable` for the caller to retry.
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("Concept not found: {0}")]
    ConceptNotFound(Uuid),

    #[error("Course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("Review session not found: {0}")]
    SessionNotFound(Uuid),

    /// The session already reached its terminal state
    #[error("Review session already ended: {0}")]
    SessionEnded(Uuid),

    #[error("Turn limit of {0} reached for this review session")]
    TurnLimitReached(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The language model call failed; no state was changed
    #[error("Language model unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] feynman_common::Error),
}

impl From<sqlx::Error> for TutorError {
    fn from(err: sqlx::Error) -> Self {
        TutorError::Storage(feynman_common::Error::Database(err))
    }
}

pub type TutorResult<T> = Result<T, TutorError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., review already ended
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream model failure (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// feynman-common error
    #[error("Common error: {0}")]
    Common(#[from] feynman_common::Error),
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::ConceptNotFound(_)
            | TutorError::CourseNotFound(_)
            | TutorError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            TutorError::SessionEnded(_) | TutorError::TurnLimitReached(_) => {
                ApiError::Conflict(err.to_string())
            }
            TutorError::InvalidInput(msg) => ApiError::BadRequest(msg),
            TutorError::UpstreamUnavailable(_) => ApiError::BadGateway(err.to_string()),
            TutorError::Storage(e) => ApiError::Common(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(err) => match err {
                feynman_common::Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                feynman_common::Error::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
                }
                other => {
                    tracing::error!(error = %other, "Storage failure while handling request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        other.to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

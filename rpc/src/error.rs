//! `ApiError`: maps `commchain_core::Error` (and HTTP-only auth failures)
//! to the status codes in `SPEC_FULL.md` §6/§7, in exactly one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use commchain_core::Error as CoreError;

#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
}

/// Thin wrapper around `commchain_core::Error` plus the auth/not-found
/// cases that only exist at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("missing or invalid token")]
    Auth,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(CoreError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(CoreError::Integrity(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(CoreError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Core(CoreError::Parse(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(CoreError::Io(err)) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            // Preserved for compatibility with the distillation rather
            // than mapped to 401.
            ApiError::Auth => (StatusCode::BAD_REQUEST, "missing or invalid token".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(%message, "unexpected server error");
        } else {
            tracing::warn!(%message, %status, "request rejected");
        }

        (status, Json(MessageBody { message })).into_response()
    }
}

//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use muslimboard_core::{ErrorKind, MuslimboardError};

use crate::dto::Envelope;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()>::failure(self.status, self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<MuslimboardError> for ApiError {
    fn from(err: MuslimboardError) -> Self {
        match err.kind() {
            ErrorKind::Validation | ErrorKind::ImageFetch | ErrorKind::StreamCopy => {
                ApiError::bad_request(err.to_string())
            }
            ErrorKind::Upstream => {
                tracing::error!(error = %err, "Upstream error");
                ApiError::internal(err.to_string())
            }
            ErrorKind::CacheRead | ErrorKind::CacheWrite | ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

//! HTTP-facing error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use push_storage::repository::RepositoryError;
use serde::Serialize;

/// API error response envelope returned on every non-2xx response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request unmodified.
    pub allow_retry: bool,
    /// Error details.
    pub error: ErrorBody,
}

/// Error body carrying a machine-readable code and a human message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// Application error type wrapping the API error response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Constructs an error with an explicit status, code, and message.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>, retry: bool) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: message.into() },
            },
        }
    }

    /// A `404 Not Found` with `code = "not_found"`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message, false)
    }

    /// A `400 Bad Request` with `code = "invalid_request"`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, false)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!(code = self.inner.error.code, message = %self.inner.error.message, "client error"),
            500..=599 => tracing::error!(code = self.inner.error.code, message = %self.inner.error.message, "server error"),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let RepositoryError::Unavailable(message) = &err;
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", message.clone(), true)
    }
}

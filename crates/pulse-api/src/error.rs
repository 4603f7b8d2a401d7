//! HTTP error type for handlers and extractors.
//!
//! `AppError` lives in `pulse-core`, which knows nothing about axum, so the
//! response mapping is implemented on the local [`ApiError`] wrapper.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pulse_core::error::{AppError, ErrorKind};

use crate::dto::response::ErrorResponse;

/// Generic message sent in place of server error details outside development.
pub const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// Detailed cause of a server error, attached to the response as an
/// extension. `expose_error_details` swaps it into the body in development.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error kind.
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal
            | ErrorKind::Cache
            | ErrorKind::Configuration
            | ErrorKind::Session
            | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(kind = %self.0.kind, error = %self.0.message, "Request failed");
        server_error_response(status, self.0.message)
    }
}

/// Build a server error response with the detail hidden behind an extension.
pub fn server_error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    let mut response = (status, Json(ErrorResponse::server_error(GENERIC_SERVER_ERROR))).into_response();
    response
        .extensions_mut()
        .insert(ErrorDetail(detail.into()));
    response
}

//! Server error handling: panic recovery and development-only details.

use std::any::Any;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::dto::response::ErrorResponse;
use crate::error::{ErrorDetail, server_error_response};
use crate::state::AppState;

/// Turns a handler panic into the standard 500 response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    error!(panic = %detail, "Handler panicked");
    server_error_response(StatusCode::INTERNAL_SERVER_ERROR, detail)
}

/// In development, replaces the generic server error message with the
/// detail carried by the response.
pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };

    if !state.config.is_development() {
        return response;
    }

    (response.status(), Json(ErrorResponse::server_error(detail))).into_response()
}

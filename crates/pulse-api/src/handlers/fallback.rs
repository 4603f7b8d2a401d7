//! Catch-all for unmatched routes.

use axum::Json;
use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::dto::response::ErrorResponse;

/// 404 with the requested path (and query) echoed back.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    (StatusCode::NOT_FOUND, Json(ErrorResponse::route_not_found(path))).into_response()
}

//! `/api` sub-application.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use crate::dto::response::{SessionResponse, StatsResponse, UsersResponse};
use crate::error::ApiResult;
use crate::extractors::Session;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UsersResponse>> {
    let users = state.realtime.snapshot().await?;
    Ok(Json(UsersResponse {
        count: users.len(),
        users,
    }))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let online_users = state.realtime.snapshot().await?.len();
    Ok(Json(StatsResponse {
        online_users,
        open_connections: state.realtime.connection_count(),
        counters: state.realtime.stats(),
    }))
}

/// GET /api/session: count views of the caller's session.
pub async fn session_views(session: Session) -> Json<SessionResponse> {
    let views = session
        .get("views")
        .await
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
        + 1;
    session.insert("views", Value::from(views)).await;
    Json(SessionResponse { views })
}

/// DELETE /api/session
pub async fn end_session(session: Session) -> Json<SessionResponse> {
    session.destroy().await;
    Json(SessionResponse { views: 0 })
}

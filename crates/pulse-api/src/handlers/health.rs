//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: super::now_iso(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.clone(),
    })
}

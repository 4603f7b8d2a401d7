//! Service banner.

use axum::Json;

use crate::dto::response::BannerResponse;

/// GET /
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Pulse relay is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: super::now_iso(),
    })
}

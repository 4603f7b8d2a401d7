//! Route definitions and the middleware stack.

use axum::handler::HandlerWithoutStateExt;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use pulse_core::config::AppConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let routes = routes(&state.config);
    with_middleware(routes, state)
}

/// Every route, the `/api` nest and the static file fallback. Unknown paths
/// and known paths with an unsupported method both get the JSON 404.
pub fn routes(config: &AppConfig) -> Router<AppState> {
    let static_files = ServeDir::new(&config.server.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(handlers::fallback::not_found.into_service());

    Router::new()
        .route("/", get(handlers::root::banner))
        .route("/health", get(handlers::health::health))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .method_not_allowed_fallback(handlers::fallback::not_found)
        .nest("/api", api_routes())
        .fallback_service(static_files)
}

/// Wrap `routes` in the middleware stack.
///
/// Layers run outermost first: tracing, access log, security headers,
/// compression, rate limiting, CORS, error details, panic recovery,
/// sessions, then the body limit and the handler.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    routes
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::session_layer,
        ))
        .layer(CatchPanicLayer::custom(middleware::errors::panic_response))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::errors::expose_error_details,
        ))
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(middleware::compression::build_compression_layer())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::security::security_headers,
        ))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `/api` sub-application
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::api::list_users))
        .route("/stats", get(handlers::api::stats))
        .route(
            "/session",
            get(handlers::api::session_views).delete(handlers::api::end_session),
        )
        .method_not_allowed_fallback(handlers::fallback::not_found)
}

//! Integration tests for the HTTP surface.

mod helpers;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use tower::ServiceExt;

use pulse_api::router::{routes, with_middleware};
use pulse_core::config::{AppConfig, PRODUCTION};

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "OK");
    assert_eq!(response.body["environment"], "development");
    assert!(response.body["uptime"].is_number());
    assert!(response.body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_banner() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["message"].is_string());
    assert_eq!(response.body["version"], "0.1.0");
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_echoes_path() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/unknown-path?x=1", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Route not found");
    assert_eq!(response.body["path"], "/unknown-path?x=1");
}

#[tokio::test]
async fn test_unknown_api_route_and_method() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/nothing-here", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["path"], "/api/nothing-here");

    let response = app.request("POST", "/missing", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_method_on_known_route_is_404() {
    let app = helpers::TestApp::new().await;

    for (method, uri) in [
        ("POST", "/health"),
        ("POST", "/"),
        ("PUT", "/api/users"),
        ("POST", "/api/session"),
    ] {
        let response = app.request(method, uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(response.body["error"], "Route not found");
        assert_eq!(response.body["path"], uri);
    }
}

#[tokio::test]
async fn test_static_index() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/index.html", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("content-type").unwrap().starts_with("text/html"));
    assert!(response.text.contains("Pulse"));
}

#[tokio::test]
async fn test_api_users_empty() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/users", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
    assert_eq!(response.body["users"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_api_stats() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/stats", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["onlineUsers"], 0);
    assert_eq!(response.body["openConnections"], 0);
    assert_eq!(response.body["messagesDroppedNoPresence"], 0);
}

#[tokio::test]
async fn test_security_headers() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("x-frame-options"), Some("SAMEORIGIN"));
    assert_eq!(response.header("referrer-policy"), Some("no-referrer"));
    assert_eq!(response.header("cross-origin-opener-policy"), Some("same-origin"));
    let csp = response.header("content-security-policy").unwrap();
    assert!(csp.starts_with("default-src 'self'"));
    assert!(csp.contains("img-src 'self' data: https:"));
}

#[tokio::test]
async fn test_security_headers_on_404() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/nope", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn test_rate_limit() {
    let mut config = AppConfig::default();
    config.rate_limit.max_requests = 2;
    let app = helpers::TestApp::with_config(config).await;

    let first = app.request("GET", "/health", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("ratelimit-limit"), Some("2"));
    assert_eq!(first.header("ratelimit-remaining"), Some("1"));
    assert!(first.header("ratelimit-reset").is_some());
    assert!(first.header("x-ratelimit-limit").is_none());

    app.request("GET", "/health", None).await;
    let third = app.request("GET", "/health", None).await;

    assert_eq!(third.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(third.text, app.config.rate_limit.message);
    assert_eq!(third.header("ratelimit-remaining"), Some("0"));
    assert!(third.header("retry-after").is_some());
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request_with_headers(
            "OPTIONS",
            "/api/users",
            None,
            &[
                ("origin", "http://localhost:3000"),
                ("access-control-request-method", "GET"),
            ],
        )
        .await;

    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3000")
    );
    assert_eq!(response.header("access-control-allow-credentials"), Some("true"));
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request_with_headers("GET", "/health", None, &[("origin", "http://evil.example")])
        .await;

    assert!(response.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_gzip_compression() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request_with_headers("GET", "/", None, &[("accept-encoding", "gzip")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-encoding"), Some("gzip"));
}

async fn boom() -> &'static str {
    panic!("kaboom")
}

/// The full application stack with one extra route that panics.
async fn panicking_router(config: AppConfig) -> Router {
    let app = helpers::TestApp::with_config(config).await;
    with_middleware(
        routes(&app.config).route("/boom", get(boom)),
        app.state.clone(),
    )
}

async fn call_boom(router: Router) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_panic_details_in_development() {
    let router = panicking_router(AppConfig::default()).await;

    let (status, headers, body) = call_boom(router).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Something went wrong!");
    assert_eq!(body["message"], "kaboom");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("ratelimit-remaining"));
}

#[tokio::test]
async fn test_panic_details_hidden_in_production() {
    let config = AppConfig {
        environment: PRODUCTION.to_string(),
        ..AppConfig::default()
    };
    let router = panicking_router(config).await;

    let (status, _, body) = call_boom(router).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Something went wrong!");
    assert_eq!(body["message"], "Internal server error");
}

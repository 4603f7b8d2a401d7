//! Integration tests for cookie sessions.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;

use pulse_core::config::{AppConfig, PRODUCTION};

#[tokio::test]
async fn test_untouched_request_sets_no_cookie() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None).await;

    assert!(response.header("set-cookie").is_none());
}

#[tokio::test]
async fn test_session_persists_across_requests() {
    let app = helpers::TestApp::new().await;

    let first = app.request("GET", "/api/session", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["views"], 1);

    let set_cookie = first.header("set-cookie").unwrap();
    assert!(set_cookie.starts_with("pulse.sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(!set_cookie.contains("Secure"));

    let cookie = first.session_cookie().unwrap();
    let second = app.request("GET", "/api/session", Some(&cookie)).await;
    assert_eq!(second.body["views"], 2);
}

#[tokio::test]
async fn test_destroyed_session_is_forgotten() {
    let app = helpers::TestApp::new().await;

    let first = app.request("GET", "/api/session", None).await;
    let cookie = first.session_cookie().unwrap();

    let destroyed = app.request("DELETE", "/api/session", Some(&cookie)).await;
    assert_eq!(destroyed.status, StatusCode::OK);
    assert!(destroyed.header("set-cookie").unwrap().contains("Max-Age=0"));

    let after = app.request("GET", "/api/session", Some(&cookie)).await;
    assert_eq!(after.body["views"], 1);
}

#[tokio::test]
async fn test_forged_cookie_starts_new_session() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/session", Some("pulse.sid=forged-session-id"))
        .await;

    assert_eq!(response.body["views"], 1);
    assert_ne!(
        response.session_cookie().as_deref(),
        Some("pulse.sid=forged-session-id")
    );
}

#[tokio::test]
async fn test_production_cookie_is_secure() {
    let config = AppConfig {
        environment: PRODUCTION.to_string(),
        ..AppConfig::default()
    };
    let app = helpers::TestApp::with_config(config).await;

    let response = app.request("GET", "/api/session", None).await;

    assert!(response.header("set-cookie").unwrap().contains("Secure"));
}

#[tokio::test]
async fn test_unmodified_session_is_kept_alive() {
    let mut config = AppConfig::default();
    config.session.max_age_seconds = 2;
    let app = helpers::TestApp::with_config(config).await;

    let first = app.request("GET", "/api/session", None).await;
    let cookie = first.session_cookie().unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;
    let touched = app.request("GET", "/health", Some(&cookie)).await;
    assert!(touched.header("set-cookie").is_none());

    tokio::time::sleep(Duration::from_millis(1300)).await;
    let later = app.request("GET", "/api/session", Some(&cookie)).await;
    assert_eq!(later.body["views"], 2);
}

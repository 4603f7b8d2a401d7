//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::future::IntoFuture;
use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use pulse_api::{AppState, build_app};
use pulse_cache::CacheManager;
use pulse_core::config::AppConfig;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
}

/// Response captured by [`TestApp::request`]
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body parsed as JSON, `Null` when it is not JSON
    pub body: Value,
    /// Raw body text
    pub text: String,
}

impl TestResponse {
    /// A header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `name=value` part of the first `Set-Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        self.header("set-cookie")
            .and_then(|c| c.split(';').next())
            .map(str::to_string)
    }
}

impl TestApp {
    /// Create a new test application with default (development) config
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a test application from a config
    pub async fn with_config(config: AppConfig) -> Self {
        let cache = CacheManager::new(&config.cache)
            .await
            .expect("Failed to init session store");
        let state = AppState::new(config.clone(), cache);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            config,
        }
    }

    /// Make a request against the router
    pub async fn request(&self, method: &str, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request_with_headers(method, uri, cookie, &[]).await
    }

    /// Make a request with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder.body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Serve the app on an ephemeral local port
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(axum::serve(listener, app).into_future());
        addr
    }
}

//! Fixed-window per-client rate limiter middleware.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use pulse_core::config::RateLimitConfig;

use crate::state::AppState;

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
static RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// In-memory fixed-window counter keyed by client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Client key → current window.
    windows: Arc<Mutex<HashMap<String, Window>>>,
    /// Requests allowed per window.
    max_requests: u32,
    /// Window length.
    window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of one rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Time until the window resets.
    pub reset_after: Duration,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds.max(1)),
        }
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request for `key`.
    pub async fn check(&self, key: &str) -> RateDecision {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        window.count = window.count.saturating_add(1);
        let allowed = window.count <= self.max_requests;

        RateDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.count),
            reset_after: self
                .window
                .saturating_sub(now.duration_since(window.started)),
        }
    }

    /// Drop windows that have already ended.
    pub async fn purge_expired(&self) -> usize {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
        before - windows.len()
    }
}

/// Rejects clients over their request budget with 429.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let config = &state.config.rate_limit;
    if !config.enabled {
        return next.run(request).await;
    }

    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let decision = state.rate_limiter.check(&key).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        let mut response =
            (StatusCode::TOO_MANY_REQUESTS, config.message.clone()).into_response();
        response.headers_mut().insert(
            header::RETRY_AFTER,
            HeaderValue::from(reset_seconds(&decision)),
        );
        response
    };

    if config.standard_headers {
        let headers = response.headers_mut();
        headers.insert(RATELIMIT_LIMIT.clone(), HeaderValue::from(decision.limit));
        headers.insert(
            RATELIMIT_REMAINING.clone(),
            HeaderValue::from(decision.remaining),
        );
        headers.insert(
            RATELIMIT_RESET.clone(),
            HeaderValue::from(reset_seconds(&decision)),
        );
    }

    response
}

fn reset_seconds(decision: &RateDecision) -> u64 {
    decision.reset_after.as_secs_f64().ceil() as u64
}

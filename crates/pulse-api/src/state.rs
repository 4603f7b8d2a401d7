//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use pulse_cache::{CacheManager, SessionStore};
use pulse_core::config::AppConfig;
use pulse_realtime::RealtimeEngine;

use crate::middleware::rate_limit::RateLimiter;
use crate::middleware::security::SecurityHeaders;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Real-time relay engine.
    pub realtime: RealtimeEngine,
    /// HTTP session store.
    pub sessions: Arc<SessionStore>,
    /// Key signing the session cookie.
    pub session_key: Key,
    /// Per-IP request limiter.
    pub rate_limiter: RateLimiter,
    /// Precomputed security response headers.
    pub security_headers: Arc<SecurityHeaders>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .field("realtime", &self.realtime)
            .finish()
    }
}

impl AppState {
    /// Build the state from validated configuration and a session backend.
    ///
    /// Spawns the relay dispatcher, so it must run inside a Tokio runtime.
    pub fn new(config: AppConfig, cache: CacheManager) -> Self {
        let realtime = RealtimeEngine::new(config.realtime.clone());
        let sessions = Arc::new(SessionStore::new(cache, &config.session));
        let session_key = Key::derive_from(config.session.secret.as_bytes());
        let rate_limiter = RateLimiter::new(&config.rate_limit);
        let security_headers = Arc::new(SecurityHeaders::from_config(&config.security));

        Self {
            config: Arc::new(config),
            realtime,
            sessions,
            session_key,
            rate_limiter,
            security_headers,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}

//! `Session` extractor: read and write the current HTTP session.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde_json::Value;
use tokio::sync::Mutex;

use pulse_cache::SessionData;
use pulse_core::error::AppError;

use crate::error::ApiError;

/// Per-request session state shared between the middleware and handlers.
#[derive(Debug)]
pub struct SessionState {
    /// Existing session id, `None` for a new session.
    pub id: Option<String>,
    /// Session fields.
    pub data: SessionData,
    /// Set on any write.
    pub modified: bool,
    /// Set by [`Session::destroy`].
    pub destroyed: bool,
}

impl SessionState {
    pub(crate) fn new(id: Option<String>, data: SessionData) -> Self {
        Self {
            id,
            data,
            modified: false,
            destroyed: false,
        }
    }
}

/// Shared handle stored in request extensions.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// The current request's session.
///
/// Requires the session middleware; without it extraction fails with a
/// 500.
#[derive(Debug, Clone)]
pub struct Session(SessionHandle);

impl Session {
    /// Read a field.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.0.lock().await.data.get(key).cloned()
    }

    /// Write a field.
    pub async fn insert(&self, key: impl Into<String>, value: Value) {
        let mut state = self.0.lock().await;
        state.data.insert(key, value);
        state.modified = true;
    }

    /// Delete the session and clear its cookie.
    pub async fn destroy(&self) {
        self.0.lock().await.destroyed = true;
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .map(Session)
            .ok_or_else(|| AppError::session("Session middleware is not installed").into())
    }
}

//! Response DTOs.

use serde::{Deserialize, Serialize};

use pulse_realtime::PresenceRecord;
use pulse_realtime::metrics::MetricsSnapshot;

/// Title used for every 5xx body.
pub const SERVER_ERROR_TITLE: &str = "Something went wrong!";

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"`.
    pub status: String,
    /// Current time, ISO-8601.
    pub timestamp: String,
    /// Seconds since start.
    pub uptime: f64,
    /// Environment name.
    pub environment: String,
}

/// `GET /` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerResponse {
    /// Greeting.
    pub message: String,
    /// Server version.
    pub version: String,
    /// Current time, ISO-8601.
    pub timestamp: String,
}

/// `GET /api/users` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    /// Joined connections, oldest first.
    pub users: Vec<PresenceRecord>,
    /// Number of entries in `users`.
    pub count: usize,
}

/// `GET /api/stats` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Joined connections.
    pub online_users: usize,
    /// Open sockets, joined or not.
    pub open_connections: usize,
    /// Relay counters.
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
}

/// `/api/session` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Times this session has been viewed.
    pub views: u64,
}

/// Error body shared by every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short title.
    pub error: String,
    /// Detail, or a generic text for server errors outside development.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Requested URI, for 404s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    /// Error with a title and a message.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
            path: None,
        }
    }

    /// 5xx body.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(SERVER_ERROR_TITLE, message)
    }

    /// 404 body echoing the requested URI.
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self {
            error: "Route not found".to_string(),
            message: None,
            path: Some(path.into()),
        }
    }
}

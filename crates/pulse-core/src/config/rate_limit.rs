//! Rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Fixed-window, per-client-IP request rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is active.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Length of a window in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Requests allowed per client within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Body of the 429 response.
    #[serde(default = "default_message")]
    pub message: String,
    /// Whether `RateLimit-*` headers are attached to responses.
    #[serde(default = "default_true")]
    pub standard_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: default_window(),
            max_requests: default_max_requests(),
            message: default_message(),
            standard_headers: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_window() -> u64 {
    15 * 60
}

fn default_max_requests() -> u32 {
    1000
}

fn default_message() -> String {
    "Too many requests from this IP, please try again in 15 minutes.".to_string()
}

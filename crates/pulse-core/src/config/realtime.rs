//! Real-time relay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity. Frames beyond it are dropped.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Capacity of the relay dispatcher queue.
    #[serde(default = "default_dispatch_buffer")]
    pub dispatch_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Grace period after a ping before the connection is considered dead.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Largest inbound frame accepted by the transport, in bytes.
    #[serde(default = "default_max_frame")]
    pub max_frame_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            dispatch_buffer_size: default_dispatch_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_frame_bytes: default_max_frame(),
        }
    }
}

impl RealtimeConfig {
    /// Ping interval as a `Duration`.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds)
    }

    /// Ping timeout as a `Duration`.
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_seconds)
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_dispatch_buffer() -> usize {
    1024
}

fn default_ping_interval() -> u64 {
    25
}

fn default_ping_timeout() -> u64 {
    20
}

fn default_max_frame() -> usize {
    1_000_000
}

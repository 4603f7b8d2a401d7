//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing;

use pulse_core::config::RealtimeConfig;

use super::handle::{ConnectionHandle, OutboundFrame};

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Grace period for the answer to a ping
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            ping_timeout: config.ping_timeout(),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends a ping every interval. Returns once the connection is dead or has
/// been silent for longer than one interval plus the timeout, at which point
/// the caller tears the connection down.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let start = time::Instant::now() + config.ping_interval;
    let mut interval = time::interval_at(start, config.ping_interval);
    let deadline = config.ping_interval + config.ping_timeout;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let idle = handle.idle_for();
        if idle > deadline {
            tracing::warn!(
                conn_id = %handle.id,
                idle_ms = idle.as_millis() as u64,
                "Heartbeat timeout"
            );
            handle.mark_dead();
            break;
        }

        if !handle.send(OutboundFrame::Ping) {
            tracing::debug!(conn_id = %handle.id, "Ping send failed");
            if !handle.is_alive() {
                break;
            }
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}

//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique connection identifier, assigned when the socket is accepted.
pub type ConnectionId = Uuid;

/// A frame queued for delivery to one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Serialized event envelope.
    Text(String),
    /// Transport-level keepalive ping.
    Ping,
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's bounded outbound queue plus
/// liveness bookkeeping used by the heartbeat.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Sender for outbound frames
    sender: mpsc::Sender<OutboundFrame>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Last inbound frame, in unix milliseconds
    last_seen: AtomicI64,
    /// Whether the connection is still alive
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle with a fresh ID
    pub fn new(sender: mpsc::Sender<OutboundFrame>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sender,
            connected_at: now,
            last_seen: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a frame for this connection.
    ///
    /// Never blocks: a full queue drops the frame, a closed queue marks the
    /// connection dead. Returns whether the frame was queued.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record inbound activity (any frame, including pongs)
    pub fn touch(&self) {
        self.last_seen
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Time elapsed since the last inbound frame
    pub fn idle_for(&self) -> Duration {
        let last = self.last_seen.load(Ordering::Relaxed);
        let elapsed = Utc::now().timestamp_millis().saturating_sub(last);
        Duration::from_millis(elapsed.max(0) as u64)
    }
}

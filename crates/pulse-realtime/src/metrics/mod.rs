//! Relay metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Relay counters, shared between the transport and the dispatcher.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total connections accepted
    pub connections_total: AtomicU64,
    /// Connections currently open
    pub connections_active: AtomicU64,
    /// Inbound events handed to the relay
    pub events_received: AtomicU64,
    /// Inbound frames ignored as malformed or unknown
    pub frames_rejected: AtomicU64,
    /// Successful `user-join` events
    pub joins: AtomicU64,
    /// Chat messages broadcast
    pub messages_relayed: AtomicU64,
    /// Chat messages dropped because the sender never joined
    pub messages_dropped_no_presence: AtomicU64,
    /// Notifications delivered
    pub notifications_delivered: AtomicU64,
    /// Targeted notifications whose user was not online
    pub notifications_unmatched: AtomicU64,
    /// Frames queued to individual connections
    pub deliveries: AtomicU64,
}

impl RelayMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Increment a counter by one
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `n` frame deliveries
    pub fn add_deliveries(&self, n: usize) {
        self.deliveries.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            messages_dropped_no_presence: self.messages_dropped_no_presence.load(Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
            notifications_unmatched: self.notifications_unmatched.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Total connections accepted
    pub connections_total: u64,
    /// Connections currently open
    pub connections_active: u64,
    /// Inbound events handed to the relay
    pub events_received: u64,
    /// Frames ignored
    pub frames_rejected: u64,
    /// Joins
    pub joins: u64,
    /// Chat messages broadcast
    pub messages_relayed: u64,
    /// Chat messages dropped for missing presence
    pub messages_dropped_no_presence: u64,
    /// Notifications delivered
    pub notifications_delivered: u64,
    /// Targeted notifications with no matching user
    pub notifications_unmatched: u64,
    /// Frames queued to connections
    pub deliveries: u64,
}

//! Connection pool: every open socket, joined or not.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::error;

use crate::message::serializer::serialize_outbound;
use crate::message::types::OutboundEvent;
use crate::relay::sink::{Audience, EventSink};

use super::handle::{ConnectionHandle, ConnectionId, OutboundFrame};

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Connection ID → connection handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns total number of open connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }
}

impl EventSink for ConnectionPool {
    fn deliver(&self, audience: Audience, event: &OutboundEvent) -> usize {
        let text = match serialize_outbound(event) {
            Ok(text) => text,
            Err(e) => {
                error!(event = event.name(), error = %e, "Failed to serialize outbound event");
                return 0;
            }
        };

        let recipients: Vec<Arc<ConnectionHandle>> = match audience {
            Audience::Connection(conn_id) => self.get(&conn_id).into_iter().collect(),
            _ => self
                .by_id
                .iter()
                .filter(|entry| audience.includes(entry.key()))
                .map(|entry| entry.value().clone())
                .collect(),
        };

        recipients
            .iter()
            .filter(|handle| handle.send(OutboundFrame::Text(text.clone())))
            .count()
    }
}

//! Top-level real-time engine that ties together the transport pool and the
//! relay dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use pulse_core::config::RealtimeConfig;
use pulse_core::result::AppResult;

use crate::connection::handle::{ConnectionHandle, ConnectionId, OutboundFrame};
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::pool::ConnectionPool;
use crate::message::serializer::deserialize_inbound;
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::presence::record::PresenceRecord;
use crate::presence::registry::{InMemoryPresenceRegistry, PresenceRegistry};
use crate::relay::dispatcher::{RelayHandle, spawn_dispatcher};
use crate::relay::handlers::Relay;

/// Central real-time engine used by the WebSocket transport.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Open sockets.
    pool: Arc<ConnectionPool>,
    /// Relay dispatcher.
    relay: RelayHandle,
    /// Metrics collector.
    pub metrics: Arc<RelayMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.pool.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine with an in-memory presence registry.
    ///
    /// Must be called inside a Tokio runtime: the dispatcher task is spawned
    /// immediately.
    pub fn new(config: RealtimeConfig) -> Self {
        Self::with_registry(config, Box::new(InMemoryPresenceRegistry::new()))
    }

    /// Creates an engine over the given presence registry.
    pub fn with_registry(config: RealtimeConfig, registry: Box<dyn PresenceRegistry>) -> Self {
        let pool = Arc::new(ConnectionPool::new());
        let metrics = Arc::new(RelayMetrics::new());
        let relay = Relay::new(registry, pool.clone(), metrics.clone());
        let (relay, _task) = spawn_dispatcher(relay, config.dispatch_buffer_size);

        info!("Real-time engine initialized");

        Self {
            pool,
            relay,
            metrics,
            config,
        }
    }

    /// Register a new socket.
    ///
    /// Returns the connection handle and the receiver the transport drains
    /// into the socket.
    pub async fn open_connection(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();
        self.relay.connected(handle.id).await;

        info!(conn_id = %handle.id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Tear down a socket and let the relay announce the departure.
    pub async fn close_connection(&self, conn_id: ConnectionId) {
        if let Some(handle) = self.pool.remove(&conn_id) {
            handle.mark_dead();
            self.metrics.connection_closed();
            self.relay.disconnected(conn_id).await;
            info!(conn_id = %conn_id, "WebSocket connection unregistered");
        }
    }

    /// Process an inbound text frame. Malformed frames and unknown events
    /// are ignored.
    pub async fn receive_text(&self, conn_id: ConnectionId, text: &str) {
        if let Some(handle) = self.pool.get(&conn_id) {
            handle.touch();
        }

        match deserialize_inbound(text) {
            Ok(event) => self.relay.dispatch(conn_id, event).await,
            Err(e) => {
                RelayMetrics::inc(&self.metrics.frames_rejected);
                debug!(conn_id = %conn_id, error = %e, "Ignoring inbound frame");
            }
        }
    }

    /// Record non-text inbound activity (pongs, pings, binary frames).
    pub fn touch(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.get(conn_id) {
            handle.touch();
        }
    }

    /// Current presence snapshot.
    pub async fn snapshot(&self) -> AppResult<Vec<PresenceRecord>> {
        self.relay.snapshot().await
    }

    /// Counter snapshot.
    pub fn stats(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of open sockets, joined or not.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Heartbeat settings for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Largest inbound frame the transport should accept.
    pub fn max_frame_bytes(&self) -> usize {
        self.config.max_frame_bytes
    }
}

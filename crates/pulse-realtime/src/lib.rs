//! # pulse-realtime
//!
//! Real-time engine for the Pulse relay. Provides:
//!
//! - WebSocket connection pool with bounded per-connection outbound queues
//! - Ping/pong heartbeat supervision
//! - The presence registry (who is online, per connection)
//! - The broadcast relay for `user-join`, `send-message`, `data-update`
//!   and `send-notification` events, run on a single dispatcher task

pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod relay;
pub mod server;

pub use connection::handle::{ConnectionHandle, ConnectionId, OutboundFrame};
pub use metrics::RelayMetrics;
pub use presence::record::PresenceRecord;
pub use presence::registry::{InMemoryPresenceRegistry, PresenceRegistry};
pub use server::RealtimeEngine;

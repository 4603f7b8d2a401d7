//! Delivery seam between the relay and the transport.

use crate::connection::handle::ConnectionId;
use crate::message::types::OutboundEvent;

/// Which connections receive an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every open connection.
    Everyone,
    /// Every open connection except one (usually the sender).
    EveryoneExcept(ConnectionId),
    /// A single connection.
    Connection(ConnectionId),
}

impl Audience {
    /// Whether `conn_id` belongs to this audience.
    pub fn includes(&self, conn_id: &ConnectionId) -> bool {
        match self {
            Self::Everyone => true,
            Self::EveryoneExcept(excluded) => excluded != conn_id,
            Self::Connection(target) => target == conn_id,
        }
    }
}

/// Fire-and-forget delivery of outbound events.
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `event` to `audience`, returning the number of connections it
    /// was queued for. Must not block.
    fn deliver(&self, audience: Audience, event: &OutboundEvent) -> usize;
}

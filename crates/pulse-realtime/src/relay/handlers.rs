//! Relay event handlers.
//!
//! Each handler reads or mutates the presence registry and emits outbound
//! events through the [`EventSink`]. Handlers never fail: inputs that cannot
//! be acted on are dropped, counted and logged at debug level.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::connection::handle::ConnectionId;
use crate::message::builder::{build_chat_message, build_user_connected, build_user_disconnected};
use crate::message::types::{
    InboundEvent, JoinPayload, MessagePayload, NotificationTarget, OutboundEvent,
};
use crate::metrics::RelayMetrics;
use crate::presence::record::PresenceRecord;
use crate::presence::registry::PresenceRegistry;

use super::sink::{Audience, EventSink};

/// The relay state machine. Owned by the dispatcher task.
#[derive(Debug)]
pub struct Relay {
    registry: Box<dyn PresenceRegistry>,
    sink: Arc<dyn EventSink>,
    metrics: Arc<RelayMetrics>,
}

impl Relay {
    /// Create a relay over a registry and a delivery sink.
    pub fn new(
        registry: Box<dyn PresenceRegistry>,
        sink: Arc<dyn EventSink>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            registry,
            sink,
            metrics,
        }
    }

    /// A transport connection opened. Nothing is registered until it joins.
    pub fn on_connect(&mut self, conn_id: ConnectionId) {
        debug!(conn_id = %conn_id, "Connection opened");
    }

    /// Handle one inbound event from `conn_id`.
    pub fn on_event(&mut self, conn_id: ConnectionId, event: InboundEvent) {
        RelayMetrics::inc(&self.metrics.events_received);
        debug!(conn_id = %conn_id, event = event.name(), "Relay event");

        match event {
            InboundEvent::UserJoin(join) => self.handle_join(conn_id, join),
            InboundEvent::SendMessage(msg) => self.handle_message(conn_id, msg),
            InboundEvent::DataUpdate(data) => self.handle_data_update(conn_id, data),
            InboundEvent::SendNotification(payload) => self.handle_notification(conn_id, payload),
        }
    }

    /// A transport connection closed.
    pub fn on_disconnect(&mut self, conn_id: ConnectionId) {
        let Some(record) = self.registry.unregister(&conn_id) else {
            debug!(conn_id = %conn_id, "Connection closed before joining");
            return;
        };

        info!(
            conn_id = %conn_id,
            user_id = %record.user_id,
            name = %record.display_name,
            "User disconnected"
        );

        self.emit(
            Audience::EveryoneExcept(conn_id),
            &build_user_disconnected(&record, Utc::now()),
        );
        self.broadcast_users_list();
    }

    /// Current presence snapshot.
    pub fn snapshot(&self) -> Vec<PresenceRecord> {
        self.registry.snapshot()
    }

    fn handle_join(&mut self, conn_id: ConnectionId, join: JoinPayload) {
        let record = self.registry.register(conn_id, join.id, join.name);
        RelayMetrics::inc(&self.metrics.joins);

        info!(
            conn_id = %conn_id,
            user_id = %record.user_id,
            name = %record.display_name,
            "User joined"
        );

        self.emit(Audience::EveryoneExcept(conn_id), &build_user_connected(&record));
        self.broadcast_users_list();
    }

    fn handle_message(&mut self, conn_id: ConnectionId, payload: MessagePayload) {
        let Some(sender) = self.registry.lookup_by_connection(&conn_id) else {
            RelayMetrics::inc(&self.metrics.messages_dropped_no_presence);
            debug!(conn_id = %conn_id, "Dropping message from connection without presence");
            return;
        };

        let message = build_chat_message(&sender, payload);
        RelayMetrics::inc(&self.metrics.messages_relayed);
        self.emit(Audience::Everyone, &OutboundEvent::NewMessage(message));
    }

    fn handle_data_update(&mut self, conn_id: ConnectionId, data: Value) {
        self.emit(
            Audience::EveryoneExcept(conn_id),
            &OutboundEvent::DataChanged(data),
        );
    }

    fn handle_notification(&mut self, conn_id: ConnectionId, payload: Value) {
        let audience = match NotificationTarget::of(&payload) {
            NotificationTarget::Everyone => Audience::Everyone,
            NotificationTarget::User(user_id) => match self.registry.find_by_user_id(&user_id) {
                Some(record) => Audience::Connection(record.connection_id),
                None => {
                    RelayMetrics::inc(&self.metrics.notifications_unmatched);
                    debug!(
                        conn_id = %conn_id,
                        user_id = %user_id,
                        "Notification target is not online"
                    );
                    return;
                }
            },
        };

        let delivered = self.emit(audience, &OutboundEvent::Notification(payload));
        if delivered > 0 {
            RelayMetrics::inc(&self.metrics.notifications_delivered);
        }
    }

    fn broadcast_users_list(&self) {
        self.emit(
            Audience::Everyone,
            &OutboundEvent::UsersList(self.registry.snapshot()),
        );
    }

    fn emit(&self, audience: Audience, event: &OutboundEvent) -> usize {
        let delivered = self.sink.deliver(audience, event);
        self.metrics.add_deliveries(delivered);
        delivered
    }
}

//! Single-task dispatcher serializing every relay handler.
//!
//! All connections funnel their lifecycle and inbound events through one
//! bounded channel. The dispatcher runs each command to completion before
//! taking the next, so handlers never interleave and the registry needs no
//! lock.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pulse_core::error::AppError;
use pulse_core::result::AppResult;

use crate::connection::handle::ConnectionId;
use crate::message::types::InboundEvent;
use crate::presence::record::PresenceRecord;

use super::handlers::Relay;

/// Work item for the dispatcher.
#[derive(Debug)]
pub enum RelayCommand {
    /// A connection opened.
    Connected(ConnectionId),
    /// A parsed inbound event.
    Frame {
        /// Sending connection
        conn_id: ConnectionId,
        /// The event
        event: InboundEvent,
    },
    /// A connection closed.
    Disconnected(ConnectionId),
    /// Read the presence snapshot.
    Snapshot(oneshot::Sender<Vec<PresenceRecord>>),
}

/// Cloneable sender side of the dispatcher.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// Report a new connection.
    pub async fn connected(&self, conn_id: ConnectionId) {
        self.send(RelayCommand::Connected(conn_id)).await;
    }

    /// Forward an inbound event.
    pub async fn dispatch(&self, conn_id: ConnectionId, event: InboundEvent) {
        self.send(RelayCommand::Frame { conn_id, event }).await;
    }

    /// Report a closed connection.
    pub async fn disconnected(&self, conn_id: ConnectionId) {
        self.send(RelayCommand::Disconnected(conn_id)).await;
    }

    /// Fetch the current presence snapshot.
    pub async fn snapshot(&self) -> AppResult<Vec<PresenceRecord>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(RelayCommand::Snapshot(reply_tx))
            .await
            .map_err(|_| AppError::service_unavailable("Relay dispatcher is not running"))?;
        reply_rx
            .await
            .map_err(|_| AppError::service_unavailable("Relay dispatcher dropped the request"))
    }

    async fn send(&self, command: RelayCommand) {
        if self.tx.send(command).await.is_err() {
            warn!("Relay dispatcher is not running, dropping command");
        }
    }
}

/// Spawn the dispatcher task. It stops once every [`RelayHandle`] is dropped.
pub fn spawn_dispatcher(relay: Relay, buffer: usize) -> (RelayHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let task = tokio::spawn(run(relay, rx));
    (RelayHandle { tx }, task)
}

async fn run(mut relay: Relay, mut rx: mpsc::Receiver<RelayCommand>) {
    info!("Relay dispatcher started");

    while let Some(command) = rx.recv().await {
        match command {
            RelayCommand::Connected(conn_id) => relay.on_connect(conn_id),
            RelayCommand::Frame { conn_id, event } => relay.on_event(conn_id, event),
            RelayCommand::Disconnected(conn_id) => relay.on_disconnect(conn_id),
            RelayCommand::Snapshot(reply) => {
                if reply.send(relay.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }
    }

    info!("Relay dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use uuid::Uuid;

    use crate::connection::pool::ConnectionPool;
    use crate::message::types::JoinPayload;
    use crate::metrics::RelayMetrics;
    use crate::presence::registry::InMemoryPresenceRegistry;

    fn spawn() -> (RelayHandle, JoinHandle<()>) {
        let relay = Relay::new(
            Box::new(InMemoryPresenceRegistry::new()),
            Arc::new(ConnectionPool::new()),
            Arc::new(RelayMetrics::new()),
        );
        spawn_dispatcher(relay, 16)
    }

    #[tokio::test]
    async fn test_commands_apply_in_order() {
        let (handle, _task) = spawn();
        let conn = Uuid::new_v4();

        handle.connected(conn).await;
        handle
            .dispatch(
                conn,
                InboundEvent::UserJoin(JoinPayload {
                    id: json!("u1"),
                    name: json!("Alice"),
                }),
            )
            .await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].connection_id, conn);

        handle.disconnected(conn).await;
        assert!(handle.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_joins_are_all_registered() {
        let (handle, _task) = spawn();

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    handle
                        .dispatch(
                            Uuid::new_v4(),
                            InboundEvent::UserJoin(JoinPayload {
                                id: json!(format!("u{i}")),
                                name: json!(format!("User {i}")),
                            }),
                        )
                        .await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(handle.snapshot().await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_dispatcher_stops_when_handles_drop() {
        let (handle, task) = spawn();
        drop(handle);
        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}

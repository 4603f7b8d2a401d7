//! WebSocket transport for the relay.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use pulse_realtime::OutboundFrame;
use pulse_realtime::connection::heartbeat::run_heartbeat;

use crate::state::AppState;

/// GET /ws: WebSocket upgrade
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max_frame = state.realtime.max_frame_bytes();
    ws.max_message_size(max_frame)
        .on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Drives one socket: an outbound forwarder, an inbound reader and the
/// heartbeat. Whichever ends first tears the connection down.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let engine = state.realtime.clone();
    let (handle, mut outbound_rx) = engine.open_connection().await;
    let conn_id = handle.id;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let msg = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Ping => Message::Ping(Default::default()),
            };
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let recv_engine = engine.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_rx.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    recv_engine.receive_text(conn_id, text.as_str()).await;
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => recv_engine.touch(&conn_id),
                Err(e) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                    break;
                }
            }
        }
    });

    let mut heartbeat_task = tokio::spawn(run_heartbeat(handle, engine.heartbeat_config()));

    let reader_finished = tokio::select! {
        _ = &mut send_task => false,
        _ = &mut recv_task => true,
        _ = &mut heartbeat_task => false,
    };

    send_task.abort();
    heartbeat_task.abort();
    if !reader_finished {
        // Every frame the reader dispatched must reach the relay before the
        // disconnect does.
        recv_task.abort();
        let _ = recv_task.await;
    }

    engine.close_connection(conn_id).await;
    info!(conn_id = %conn_id, "WebSocket connection closed");
}

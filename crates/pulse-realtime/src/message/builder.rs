//! Builders for outbound relay events.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::presence::record::PresenceRecord;

use super::types::{ChatMessage, DEFAULT_MESSAGE_TYPE, MessagePayload, OutboundEvent};

/// Build a chat message. Identity comes from the sender's presence record,
/// never from the payload.
pub fn build_chat_message(sender: &PresenceRecord, payload: MessagePayload) -> ChatMessage {
    let kind = payload
        .kind
        .unwrap_or_else(|| Value::from(DEFAULT_MESSAGE_TYPE));

    ChatMessage {
        id: Uuid::new_v4(),
        user_id: sender.user_id.clone(),
        user_name: sender.display_name.clone(),
        content: payload.content,
        timestamp: Utc::now(),
        kind,
    }
}

/// Build a `user-connected` event
pub fn build_user_connected(record: &PresenceRecord) -> OutboundEvent {
    OutboundEvent::UserConnected {
        id: record.user_id.clone(),
        name: record.display_name.clone(),
        connected_at: record.connected_at,
    }
}

/// Build a `user-disconnected` event
pub fn build_user_disconnected(record: &PresenceRecord, at: DateTime<Utc>) -> OutboundEvent {
    OutboundEvent::UserDisconnected {
        id: record.user_id.clone(),
        name: record.display_name.clone(),
        disconnected_at: at,
    }
}

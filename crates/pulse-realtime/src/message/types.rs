//! Inbound and outbound relay event definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::presence::record::PresenceRecord;

use super::serializer::serialize_timestamp;

/// Wire envelope shared by both directions: `{"event": "...", "data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Why an inbound frame was ignored.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame is not a JSON envelope.
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The envelope names an event the relay does not handle.
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `user-join`: announce an identity for this connection.
    UserJoin(JoinPayload),
    /// `send-message`: chat message from a joined connection.
    SendMessage(MessagePayload),
    /// `data-update`: opaque payload relayed to everyone else.
    DataUpdate(Value),
    /// `send-notification`: payload with an optional `targetUserId`.
    SendNotification(Value),
}

impl InboundEvent {
    pub(crate) fn from_frame(frame: RawFrame) -> Result<Self, FrameError> {
        let RawFrame { event, data } = frame;
        match event.as_str() {
            "user-join" => Ok(Self::UserJoin(JoinPayload::from_data(&data))),
            "send-message" => Ok(Self::SendMessage(MessagePayload::from_data(&data))),
            "data-update" => Ok(Self::DataUpdate(data)),
            "send-notification" => Ok(Self::SendNotification(data)),
            _ => Err(FrameError::UnknownEvent(event)),
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserJoin(_) => "user-join",
            Self::SendMessage(_) => "send-message",
            Self::DataUpdate(_) => "data-update",
            Self::SendNotification(_) => "send-notification",
        }
    }
}

/// Input of `user-join`.
///
/// Both fields are taken as sent, whatever their JSON type. A missing field,
/// or a payload that is not an object, leaves them `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinPayload {
    /// Logical user ID
    pub id: Value,
    /// Display name
    pub name: Value,
}

impl JoinPayload {
    /// Read `id` and `name` from a `user-join` payload.
    pub fn from_data(data: &Value) -> Self {
        Self {
            id: field(data, "id"),
            name: field(data, "name"),
        }
    }
}

/// Input of `send-message`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePayload {
    /// Opaque message body
    pub content: Value,
    /// Client-chosen category. `None` when absent or falsy.
    pub kind: Option<Value>,
}

impl MessagePayload {
    /// Read `content` and `type` from a `send-message` payload.
    pub fn from_data(data: &Value) -> Self {
        Self {
            content: field(data, "content"),
            kind: data.get("type").filter(|kind| is_truthy(kind)).cloned(),
        }
    }
}

fn field(data: &Value, name: &str) -> Value {
    data.get(name).cloned().unwrap_or(Value::Null)
}

/// Default category for chat messages.
pub const DEFAULT_MESSAGE_TYPE: &str = "text";

/// A chat message as broadcast in `new-message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server-generated ID
    pub id: Uuid,
    /// Sender's user ID, from the registry
    pub user_id: Value,
    /// Sender's display name, from the registry
    pub user_name: Value,
    /// Opaque body
    pub content: Value,
    /// Broadcast time
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Category
    #[serde(rename = "type")]
    pub kind: Value,
}

/// Events sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum OutboundEvent {
    /// Someone joined.
    UserConnected {
        /// User ID
        id: Value,
        /// Display name
        name: Value,
        /// Join time
        #[serde(rename = "connectedAt", serialize_with = "serialize_timestamp")]
        connected_at: DateTime<Utc>,
    },
    /// Full presence snapshot.
    UsersList(Vec<PresenceRecord>),
    /// Chat message.
    NewMessage(ChatMessage),
    /// Relayed `data-update` payload.
    DataChanged(Value),
    /// Relayed `send-notification` payload.
    Notification(Value),
    /// Someone left.
    UserDisconnected {
        /// User ID
        id: Value,
        /// Display name
        name: Value,
        /// Departure time
        #[serde(rename = "disconnectedAt", serialize_with = "serialize_timestamp")]
        disconnected_at: DateTime<Utc>,
    },
}

impl OutboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserConnected { .. } => "user-connected",
            Self::UsersList(_) => "users-list",
            Self::NewMessage(_) => "new-message",
            Self::DataChanged(_) => "data-changed",
            Self::Notification(_) => "notification",
            Self::UserDisconnected { .. } => "user-disconnected",
        }
    }
}

/// Recipient of a `send-notification` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationTarget {
    /// Every open connection.
    Everyone,
    /// The connection registered for this user ID.
    User(Value),
}

impl NotificationTarget {
    /// Read `targetUserId` from a notification payload. Absent, `null`,
    /// `false`, `0` and `""` all address everyone.
    pub fn of(payload: &Value) -> Self {
        match payload.get("targetUserId") {
            Some(target) if is_truthy(target) => Self::User(target.clone()),
            _ => Self::Everyone,
        }
    }
}

/// JavaScript truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strict identity of two client-supplied IDs.
///
/// Scalars compare by type and value, so `42` never matches `"42"`. Arrays
/// and objects never match anything.
pub fn same_id(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

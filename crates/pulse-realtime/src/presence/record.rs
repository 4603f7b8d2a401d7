//! Presence record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::handle::ConnectionId;
use crate::message::serializer::serialize_timestamp;

/// One registry entry: a joined connection and the identity it announced.
///
/// Serialized with the field names clients see in `users-list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// Client-supplied user ID, kept as sent. Not unique across connections.
    #[serde(rename = "id")]
    pub user_id: Value,
    /// Client-supplied display name, kept as sent.
    #[serde(rename = "name")]
    pub display_name: Value,
    /// Connection the record belongs to.
    #[serde(rename = "socketId")]
    pub connection_id: ConnectionId,
    /// When the join was registered.
    #[serde(rename = "connectedAt", serialize_with = "serialize_timestamp")]
    pub connected_at: DateTime<Utc>,
}

//! JSON framing for relay events.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

use super::types::{FrameError, InboundEvent, OutboundEvent, RawFrame};

/// Serialize an outbound event as an `{"event", "data"}` envelope
pub fn serialize_outbound(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Parse an inbound text frame into a relay event
pub fn deserialize_inbound(text: &str) -> Result<InboundEvent, FrameError> {
    let frame: RawFrame = serde_json::from_str(text).map_err(FrameError::Malformed)?;
    InboundEvent::from_frame(frame)
}

/// Timestamps go out as ISO-8601 with millisecond precision.
pub fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

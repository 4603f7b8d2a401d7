//! Relay event types, parsing and serialization.

pub mod builder;
pub mod serializer;
pub mod types;

pub use types::{ChatMessage, InboundEvent, NotificationTarget, OutboundEvent};

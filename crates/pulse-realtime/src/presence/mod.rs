//! Presence: who is online, per connection.

pub mod record;
pub mod registry;

pub use record::PresenceRecord;
pub use registry::{InMemoryPresenceRegistry, PresenceRegistry};

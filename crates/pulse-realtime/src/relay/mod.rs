//! Presence and broadcast relay.

pub mod dispatcher;
pub mod handlers;
pub mod sink;

pub use dispatcher::{RelayCommand, RelayHandle, spawn_dispatcher};
pub use handlers::Relay;
pub use sink::{Audience, EventSink};

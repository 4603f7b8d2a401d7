//! # pulse-cache
//!
//! Key-value backends for the Pulse HTTP session store. Supports two modes:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//!   with per-entry expiry
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod session;

pub use provider::CacheManager;
pub use session::{SessionData, SessionStore};

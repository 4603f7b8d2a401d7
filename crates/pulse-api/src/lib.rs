//! # pulse-api
//!
//! HTTP layer for Pulse built on Axum.
//!
//! Provides the health and banner routes, the `/api` sub-application, the
//! WebSocket transport for the relay, static file serving, cookie sessions,
//! and the middleware stack (security headers, rate limiting, CORS,
//! compression, logging, error mapping).

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use state::AppState;

//! # pulse-core
//!
//! Core crate for the Pulse relay. Contains the configuration schema,
//! the unified error system, and the traits shared by the other crates.
//!
//! This crate has **no** internal dependencies on other Pulse crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

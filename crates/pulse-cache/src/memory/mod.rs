//! In-process provider.

pub mod store;

pub use store::MemoryCacheProvider;

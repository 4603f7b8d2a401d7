//! Route handlers.

pub mod api;
pub mod fallback;
pub mod health;
pub mod root;
pub mod ws;

pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

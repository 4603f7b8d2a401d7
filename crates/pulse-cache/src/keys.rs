//! Key builders for entries written by Pulse.

/// Key under which a session's data is stored.
pub fn session(prefix: &str, session_id: &str) -> String {
    format!("{prefix}{session_id}")
}

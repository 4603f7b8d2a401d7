//! HTTP session cookie configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum secret length accepted for deriving the cookie signing key.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_SECRET: &str = "pulse-development-session-secret-change-me";

/// Cookie session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Secret used to sign the session cookie.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Cookie and stored-session lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
    /// Force the `Secure` flag. Derived from the environment when unset.
    #[serde(default)]
    pub secure: Option<bool>,
    /// Key prefix under which sessions are stored.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secret: default_secret(),
            max_age_seconds: default_max_age(),
            secure: None,
            key_prefix: default_key_prefix(),
        }
    }
}

impl SessionConfig {
    /// Validate the session settings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(AppError::configuration(format!(
                "session.secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.cookie_name.is_empty() {
            return Err(AppError::configuration("session.cookie_name must not be empty"));
        }
        Ok(())
    }

    /// Whether the built-in development secret is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

fn default_cookie_name() -> String {
    "pulse.sid".to_string()
}

fn default_secret() -> String {
    DEFAULT_SECRET.to_string()
}

fn default_max_age() -> u64 {
    24 * 60 * 60
}

fn default_key_prefix() -> String {
    "session:".to_string()
}

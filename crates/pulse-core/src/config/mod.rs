//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `PULSE__`-prefixed environment variables. Each sub-module
//! represents a logical configuration section.

pub mod app;
pub mod cache;
pub mod logging;
pub mod rate_limit;
pub mod realtime;
pub mod security;
pub mod session;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::cache::CacheConfig;
pub use self::logging::LoggingConfig;
pub use self::rate_limit::RateLimitConfig;
pub use self::realtime::RealtimeConfig;
pub use self::security::SecurityConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Name of the environment in which detailed error messages are exposed.
pub const DEVELOPMENT: &str = "development";

/// Name of the production environment.
pub const PRODUCTION: &str = "production";

/// Root application configuration.
///
/// Every section has defaults, so an empty configuration source yields a
/// runnable development setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name (`development`, `production`, ...).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Security response headers.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Per-IP request rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Cookie session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Session store backend.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Real-time relay settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            rate_limit: RateLimitConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
            realtime: RealtimeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `{dir}/default.toml`, `{dir}/{env}.toml` and environment
    /// variables prefixed with `PULSE__` (e.g. `PULSE__SERVER__PORT`).
    pub fn load(config_dir: impl AsRef<Path>, env: &str) -> Result<Self, AppError> {
        let dir = config_dir.as_ref();

        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(env)).required(false))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .with_list_parse_key("server.cors.allowed_methods")
                    .with_list_parse_key("server.cors.allowed_headers"),
            )
            .set_override("environment", env)?
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        self.session.validate()?;

        if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
            return Err(AppError::configuration(
                "rate_limit.max_requests must be greater than zero",
            ));
        }

        if self.realtime.ping_interval_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.ping_interval_seconds must be greater than zero",
            ));
        }

        if self.is_production() && self.session.uses_default_secret() {
            tracing::warn!("session.secret is the built-in default; set PULSE__SESSION__SECRET");
        }

        Ok(())
    }

    /// Whether detailed error messages may be sent to clients.
    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }

    /// Whether the server runs in production.
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Whether session cookies carry the `Secure` flag.
    pub fn secure_cookies(&self) -> bool {
        self.session.secure.unwrap_or_else(|| self.is_production())
    }
}

fn default_environment() -> String {
    DEVELOPMENT.to_string()
}

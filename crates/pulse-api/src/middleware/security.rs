//! Security response headers.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use pulse_core::config::SecurityConfig;

use crate::state::AppState;

/// Header set applied to every response, computed once from configuration.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Render the configured headers. Values that are not valid header
    /// text are skipped with a warning.
    pub fn from_config(config: &SecurityConfig) -> Self {
        if !config.enabled {
            return Self::default();
        }

        let mut raw: Vec<(HeaderName, String)> = vec![
            (header::CONTENT_SECURITY_POLICY, config.csp_header_value()),
            (
                HeaderName::from_static("cross-origin-opener-policy"),
                "same-origin".to_string(),
            ),
            (
                HeaderName::from_static("cross-origin-resource-policy"),
                "same-origin".to_string(),
            ),
            (HeaderName::from_static("origin-agent-cluster"), "?1".to_string()),
            (header::REFERRER_POLICY, config.referrer_policy.clone()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (header::X_DNS_PREFETCH_CONTROL, "off".to_string()),
            (
                HeaderName::from_static("x-download-options"),
                "noopen".to_string(),
            ),
            (header::X_FRAME_OPTIONS, config.frame_options.clone()),
            (
                HeaderName::from_static("x-permitted-cross-domain-policies"),
                "none".to_string(),
            ),
            (header::X_XSS_PROTECTION, "0".to_string()),
        ];

        if config.hsts_max_age_seconds > 0 {
            raw.push((
                header::STRICT_TRANSPORT_SECURITY,
                format!("max-age={}; includeSubDomains", config.hsts_max_age_seconds),
            ));
        }

        let headers = raw
            .into_iter()
            .filter_map(|(name, value)| match HeaderValue::from_str(&value) {
                Ok(value) => Some((name, value)),
                Err(_) => {
                    warn!(header = %name, "Skipping invalid security header value");
                    None
                }
            })
            .collect();

        Self { headers }
    }

    /// Header pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.headers.iter()
    }
}

/// Adds the security headers unless a handler already set them.
pub async fn security_headers(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in state.security_headers.iter() {
        if !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let headers = SecurityHeaders::from_config(&SecurityConfig::default());
        let get = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| n.as_str() == name)
                .map(|(_, v)| v.to_str().unwrap().to_string())
        };

        assert_eq!(get("x-content-type-options").as_deref(), Some("nosniff"));
        assert_eq!(get("x-frame-options").as_deref(), Some("SAMEORIGIN"));
        assert_eq!(
            get("strict-transport-security").as_deref(),
            Some("max-age=15552000; includeSubDomains")
        );
        assert!(get("content-security-policy").unwrap().contains("connect-src 'self' ws: wss:"));
    }

    #[test]
    fn test_disabled_emits_nothing() {
        let config = SecurityConfig {
            enabled: false,
            ..SecurityConfig::default()
        };
        assert_eq!(SecurityHeaders::from_config(&config).iter().count(), 0);
    }
}

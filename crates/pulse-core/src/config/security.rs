//! Security response header configuration.

use serde::{Deserialize, Serialize};

/// Security headers applied to every HTTP response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Whether security headers are emitted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Content-Security-Policy directives, in emission order.
    #[serde(default = "default_csp")]
    pub content_security_policy: Vec<CspDirective>,
    /// `Strict-Transport-Security` max-age in seconds (0 disables the header).
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age_seconds: u64,
    /// `X-Frame-Options` value.
    #[serde(default = "default_frame_options")]
    pub frame_options: String,
    /// `Referrer-Policy` value.
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            content_security_policy: default_csp(),
            hsts_max_age_seconds: default_hsts_max_age(),
            frame_options: default_frame_options(),
            referrer_policy: default_referrer_policy(),
        }
    }
}

impl SecurityConfig {
    /// Render the CSP directives as a header value.
    pub fn csp_header_value(&self) -> String {
        self.content_security_policy
            .iter()
            .map(CspDirective::render)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// A single Content-Security-Policy directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CspDirective {
    /// Directive name, e.g. `default-src`.
    pub name: String,
    /// Source expressions. Empty for value-less directives.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl CspDirective {
    fn new(name: &str, sources: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render(&self) -> String {
        if self.sources.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.sources.join(" "))
        }
    }
}

fn default_csp() -> Vec<CspDirective> {
    vec![
        CspDirective::new("default-src", &["'self'"]),
        CspDirective::new("style-src", &["'self'", "'unsafe-inline'"]),
        CspDirective::new("script-src", &["'self'"]),
        CspDirective::new("img-src", &["'self'", "data:", "https:"]),
        CspDirective::new("connect-src", &["'self'", "ws:", "wss:"]),
        CspDirective::new("base-uri", &["'self'"]),
        CspDirective::new("font-src", &["'self'", "https:", "data:"]),
        CspDirective::new("form-action", &["'self'"]),
        CspDirective::new("frame-ancestors", &["'self'"]),
        CspDirective::new("object-src", &["'none'"]),
        CspDirective::new("script-src-attr", &["'none'"]),
        CspDirective::new("upgrade-insecure-requests", &[]),
    ]
}

fn default_true() -> bool {
    true
}

fn default_hsts_max_age() -> u64 {
    15_552_000
}

fn default_frame_options() -> String {
    "SAMEORIGIN".to_string()
}

fn default_referrer_policy() -> String {
    "no-referrer".to_string()
}

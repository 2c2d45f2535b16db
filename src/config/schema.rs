//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP surface: port, mount context, routes and content roots.
    pub http: HttpConfig,

    /// Third-party integrations exposed to page templates.
    pub google: GoogleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Verbose template logging.
    pub debug: bool,
}

/// HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Listening port.
    pub port: u16,

    /// Mount path of the dispatcher (e.g., "/" or "/site").
    pub context: String,

    /// Where templates and static files come from.
    pub content: ContentConfig,

    /// Request path → template name.
    pub controllers: BTreeMap<String, String>,

    /// Shared templates compiled alongside every page.
    pub includes: Vec<String>,

    /// Request path → redirect target.
    pub redirects: BTreeMap<String, RedirectConfig>,

    /// Status code → error page file or template.
    pub error_pages: BTreeMap<String, String>,

    /// Credential file guarding `/metrics`.
    pub password: PasswordConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8888,
            context: "/".to_string(),
            content: ContentConfig::default(),
            controllers: BTreeMap::new(),
            includes: Vec::new(),
            redirects: BTreeMap::new(),
            error_pages: BTreeMap::new(),
            password: PasswordConfig::default(),
        }
    }
}

/// Content roots.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentConfig {
    /// Serve from the bundle compiled into the binary instead of the filesystem.
    pub use_embedded: bool,

    /// Templates directory (bundle-relative when embedded).
    pub templates_directory: String,

    /// Static files directory (bundle-relative when embedded).
    pub static_directory: String,

    /// File suffix that marks an error page override as a template.
    pub template_suffix: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            use_embedded: true,
            templates_directory: "templates".to_string(),
            static_directory: "static".to_string(),
            template_suffix: ".jinja".to_string(),
        }
    }
}

/// A configured redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    /// Target URL, or `env.NAME` to read it from an environment variable.
    pub location: String,

    /// Redirect status code (default: 301).
    #[serde(default)]
    pub code: Option<u16>,
}

/// Basic auth credential file settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Path to the `username:bcrypt-hash` file.
    pub file: String,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            file: "/etc/pepper/.passwd".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GoogleConfig {
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub id: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

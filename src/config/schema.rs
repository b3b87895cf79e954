//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration for the rendering server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SsrConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application mounted by the render stage.
    pub app: AppConfig,

    /// Client asset source for the static stage.
    pub assets: AssetsConfig,

    /// Redirect stages, applied in order.
    pub redirects: Vec<RedirectConfig>,

    /// Catch stage for unhandled requests.
    pub catch: CatchConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

/// Application served by the render stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base path the application is mounted under.
    pub base: String,

    pub mode: Mode,

    /// Path to the HTML template.
    pub template_path: String,

    /// Selector of the element receiving the rendered markup.
    pub target_selector: String,

    /// Secret for the encrypted prop hand-off. Required in production.
    pub secret_salt: Option<String>,

    pub verbose: bool,

    /// Also log preload results.
    pub debug: bool,

    /// Inline component CSS into the document head.
    pub inline_css: bool,

    /// Reload the template when the file changes.
    pub watch_template: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
            mode: Mode::default(),
            template_path: String::new(),
            target_selector: "#app".to_string(),
            secret_salt: None,
            verbose: false,
            debug: false,
            inline_css: false,
            watch_template: false,
        }
    }
}

/// Client asset source.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AssetsConfig {
    /// Built client asset directory.
    pub directory: Option<String>,

    /// Client development server address (`host:port`).
    pub dev_server: Option<String>,
}

/// One redirect stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    /// Exact base-relative path to match.
    #[serde(default, rename = "match")]
    pub exact: Option<String>,

    /// Regular expression matched against the base-relative path.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Base-relative destination.
    #[serde(default = "default_redirect_to")]
    pub to: String,

    #[serde(default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_to() -> String {
    "/".to_string()
}

fn default_redirect_status() -> u16 {
    301
}

/// Catch stage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatchConfig {
    pub status: u16,
    pub body: String,
    /// Redirect unhandled requests here instead of answering `status`.
    pub redirect: Option<String>,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            status: 404,
            body: "Not Found".to_string(),
            redirect: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: SsrConfig = toml::from_str(
            r#"
            [app]
            template_path = "dist/index.html"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.app.base, "/");
        assert_eq!(config.app.target_selector, "#app");
        assert_eq!(config.app.mode, Mode::Production);
        assert_eq!(config.catch.status, 404);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_redirect_defaults() {
        let config: SsrConfig = toml::from_str(
            r#"
            [[redirects]]
            match = "/old"

            [[redirects]]
            pattern = "^/legacy/.*"
            to = "/new"
            status = 302
            "#,
        )
        .unwrap();
        assert_eq!(config.redirects[0].exact.as_deref(), Some("/old"));
        assert_eq!(config.redirects[0].to, "/");
        assert_eq!(config.redirects[0].status, 301);
        assert_eq!(config.redirects[1].status, 302);
    }

    #[test]
    fn test_mode_names() {
        let config: SsrConfig = toml::from_str("[app]\nmode = \"development\"").unwrap();
        assert_eq!(config.app.mode, Mode::Development);
        assert_eq!(Mode::Development.to_string(), "development");
    }
}

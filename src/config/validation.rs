//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the options each pipeline stage requires
//! - Validate value ranges (redirect statuses, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SsrConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use regex::Regex;

use crate::config::schema::{Mode, SsrConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &SsrConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "must be an ip:port socket address",
        ));
    }

    let app = &config.app;
    if !app.base.starts_with('/') {
        errors.push(ValidationError::new("app.base", "must start with '/'"));
    }
    if app.template_path.trim().is_empty() {
        errors.push(ValidationError::new("app.template_path", "is required"));
    }
    if app.target_selector.trim().is_empty() {
        errors.push(ValidationError::new("app.target_selector", "is required"));
    }
    match (&app.secret_salt, app.mode) {
        (Some(secret), _) if secret.is_empty() => {
            errors.push(ValidationError::new("app.secret_salt", "must not be empty"));
        }
        (None, Mode::Production) => {
            errors.push(ValidationError::new(
                "app.secret_salt",
                "is required in production mode",
            ));
        }
        _ => {}
    }

    if app.mode == Mode::Development
        && config.assets.directory.is_none()
        && config.assets.dev_server.is_none()
    {
        errors.push(ValidationError::new(
            "assets.dev_server",
            "is required in development mode when no asset directory is set",
        ));
    }

    for (i, redirect) in config.redirects.iter().enumerate() {
        let field = |name: &str| format!("redirects[{}].{}", i, name);
        match (&redirect.exact, &redirect.pattern) {
            (Some(_), Some(_)) | (None, None) => {
                errors.push(ValidationError::new(
                    field("match"),
                    "exactly one of 'match' or 'pattern' is required",
                ));
            }
            (None, Some(pattern)) => {
                if let Err(e) = Regex::new(pattern) {
                    errors.push(ValidationError::new(field("pattern"), e.to_string()));
                }
            }
            (Some(_), None) => {}
        }
        if !(300..400).contains(&redirect.status) {
            errors.push(ValidationError::new(field("status"), "must be a 3xx status"));
        }
    }

    if !(100..600).contains(&config.catch.status) {
        errors.push(ValidationError::new("catch.status", "must be a valid HTTP status"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be an ip:port socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

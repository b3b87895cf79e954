//! Error definitions shared across the pipeline.
//!
//! Setup errors abort startup. Request errors are isolated per request and
//! travel to the catch stage through the response (see [`ErrorReport`]).

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Boxed error returned by user code (preload callbacks, components).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing middleware. Never retried.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A required option is missing or empty.
    #[error("Option '{option}' is required: {reason}")]
    Configuration {
        option: &'static str,
        reason: &'static str,
    },

    /// The template file could not be read.
    #[error("Unable to read template '{}': {source}", path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target selector matched no element of the template.
    #[error("Unable to find element for selector '{selector}' in template '{}'", path.display())]
    TemplateTargetNotFound { path: PathBuf, selector: String },

    /// The selector syntax is not supported.
    #[error("Unsupported selector '{0}': expected tag, #id, .class or a combination")]
    InvalidSelector(String),

    /// The head and target regions overlap.
    #[error("Template '{}' is invalid: {reason}", path.display())]
    InvalidTemplate { path: PathBuf, reason: String },

    /// A match pattern failed to compile.
    #[error("Invalid match pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The prop codec could not be built.
    #[error("Prop codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Errors raised while handling a single request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The preload callback failed.
    #[error("Preload request failed: {0}")]
    Preload(#[source] BoxError),

    /// The component failed to render (or panicked while rendering).
    #[error("Render failed: {0}")]
    Render(#[source] BoxError),

    /// The props could not be encoded for the client.
    #[error("Unable to encode props: {0}")]
    Encode(#[from] CodecError),
}

impl RequestError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::Preload(_) => "preload_error",
            RequestError::Render(_) => "render_error",
            RequestError::Encode(_) => "encode_error",
        }
    }
}

/// Errors from the prop codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("secret must not be empty")]
    EmptySecret,

    #[error("props serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("props encryption failed")]
    Encrypt,

    /// Malformed payload, wrong secret, or unsupported format version.
    #[error("props payload could not be decoded: {0}")]
    Decode(String),
}

/// Errors from the client hydration renderer.
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("Option '{0}' should be passed")]
    Configuration(&'static str),

    #[error("Unable to find target html element for selector '{0}'")]
    TargetNotFound(String),

    /// The target selector syntax is not supported.
    #[error("Unsupported selector '{0}'")]
    InvalidSelector(String),

    /// The component failed to mount.
    #[error("Mount failed: {0}")]
    Mount(BoxError),
}

/// Error details carried from a failing stage to the catch stage.
///
/// Stored in the response extensions so an outer layer can observe the
/// failure without the failing stage sending anything itself.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl From<&RequestError> for ErrorReport {
    fn from(err: &RequestError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        response.extensions_mut().insert(ErrorReport::from(&self));
        response
    }
}

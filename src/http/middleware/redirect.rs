//! Redirect middleware: a match middleware whose callback redirects to a
//! base-qualified url.

use axum::http::StatusCode;

use crate::error::SetupError;
use crate::http::middleware::matching::{MatchMiddleware, MatchOptions};
use crate::http::response;
use crate::preload::result::DEFAULT_REDIRECT_STATUS;
use crate::routing::{normalize, qualify_with_base, PathMatch};

pub const DEFAULT_REDIRECT_URL: &str = "/";

/// Options for [`redirect_middleware`].
#[derive(Debug, Clone)]
pub struct RedirectOptions {
    pub base: String,
    pub matcher: Option<PathMatch>,
    /// Base-relative destination.
    pub url: String,
    pub status: StatusCode,
    pub verbose: bool,
}

impl Default for RedirectOptions {
    fn default() -> Self {
        Self {
            base: String::new(),
            matcher: None,
            url: DEFAULT_REDIRECT_URL.to_string(),
            status: DEFAULT_REDIRECT_STATUS,
            verbose: false,
        }
    }
}

impl RedirectOptions {
    pub fn new(base: impl Into<String>, matcher: PathMatch, url: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            matcher: Some(matcher),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// Build a redirect middleware.
pub fn redirect_middleware(options: RedirectOptions) -> Result<MatchMiddleware, SetupError> {
    if !options.status.is_redirection() {
        return Err(SetupError::Configuration {
            option: "status",
            reason: "redirect status must be a 3xx code",
        });
    }

    let location = qualify_with_base(&normalize(&options.base), &options.url);
    let status = options.status;
    let verbose = options.verbose;

    MatchMiddleware::new(
        MatchOptions {
            base: options.base,
            matcher: options.matcher,
            verbose,
        },
        move |request, _next| {
            let location = location.clone();
            async move {
                if verbose {
                    tracing::debug!(
                        from = %request.uri().path(),
                        to = %location,
                        status = %status,
                        "Redirect request"
                    );
                }
                response::redirect(status, &location)
            }
        },
    )
}

//! Match middleware: run a callback only for requests under a base whose
//! remainder satisfies a literal or pattern match.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use futures_util::future::{BoxFuture, FutureExt};

use crate::error::SetupError;
use crate::routing::{normalize, normalize_with_base, PathMatch};

/// Callback invoked on a match. It owns the rest of the chain via `next`.
pub type MatchCallback = Arc<dyn Fn(Request<Body>, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Options for [`MatchMiddleware`].
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub base: String,
    pub matcher: Option<PathMatch>,
    pub verbose: bool,
}

impl MatchOptions {
    pub fn new(base: impl Into<String>, matcher: PathMatch) -> Self {
        Self {
            base: base.into(),
            matcher: Some(matcher),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Outcome of testing a path against a match middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    OutsideBase,
    Mismatch,
    /// Matched, with the base-relative remainder.
    Matched(String),
}

pub struct MatchMiddleware {
    base: String,
    matcher: PathMatch,
    callback: MatchCallback,
    verbose: bool,
}

impl MatchMiddleware {
    pub fn new<F, Fut>(options: MatchOptions, callback: F) -> Result<Self, SetupError>
    where
        F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        if options.base.trim().is_empty() {
            return Err(SetupError::Configuration {
                option: "base",
                reason: "required to serve match requests",
            });
        }
        let matcher = options.matcher.ok_or(SetupError::Configuration {
            option: "match",
            reason: "required to serve match requests",
        })?;
        let base = normalize(&options.base);

        tracing::info!(
            base = %base,
            matcher = %matcher,
            "Use custom middleware to handle base related requests"
        );

        Ok(Self {
            base,
            matcher,
            callback: Arc::new(move |req, next| callback(req, next).boxed()),
            verbose: options.verbose,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Test a raw request path.
    pub fn decide(&self, path: &str) -> MatchDecision {
        match normalize_with_base(&self.base, path) {
            None => MatchDecision::OutsideBase,
            Some(remainder) if self.matcher.matches(&remainder) => MatchDecision::Matched(remainder),
            Some(_) => MatchDecision::Mismatch,
        }
    }

    pub async fn handle(&self, request: Request<Body>, next: Next) -> Response {
        let path = request.uri().path().to_string();
        if self.verbose {
            tracing::trace!(path = %path, "Match request candidate");
        }

        match self.decide(&path) {
            MatchDecision::OutsideBase => {
                if self.verbose {
                    tracing::debug!(base = %self.base, "Request is outside of the base path");
                }
                next.run(request).await
            }
            MatchDecision::Mismatch => {
                if self.verbose {
                    tracing::debug!(matcher = %self.matcher, "Request path does not match");
                }
                next.run(request).await
            }
            MatchDecision::Matched(remainder) => {
                if self.verbose {
                    tracing::debug!(
                        path = %path,
                        remainder = %remainder,
                        matcher = %self.matcher,
                        "Perform match request callback"
                    );
                }
                (self.callback)(request, next).await
            }
        }
    }
}

/// Axum middleware function for a [`MatchMiddleware`].
pub async fn match_middleware(
    State(middleware): State<Arc<MatchMiddleware>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    middleware.handle(request, next).await
}

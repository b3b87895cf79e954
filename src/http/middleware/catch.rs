//! Catch stage: terminal fallback and error handler of the pipeline.
//!
//! Two halves share one configuration:
//! - [`catch_errors`] wraps the whole chain and turns an [`ErrorReport`]
//!   left on a response by a failing stage into the client-facing failure
//! - [`catch_fallback`] answers requests no earlier stage handled

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorReport;
use crate::http::request::request_id;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{is_within_base, normalize, qualify_with_base};

/// Builds the response sent for a delegated request error.
pub type ErrorHandler = Arc<dyn Fn(&ErrorReport) -> Response + Send + Sync>;

/// Options for [`CatchMiddleware`].
#[derive(Clone)]
pub struct CatchOptions {
    pub base: String,
    /// Status for unhandled requests under the base.
    pub status: StatusCode,
    pub body: String,
    /// Redirect unhandled requests to this base-relative url instead.
    pub redirect: Option<String>,
    pub on_error: Option<ErrorHandler>,
    pub verbose: bool,
}

impl Default for CatchOptions {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
            status: StatusCode::NOT_FOUND,
            body: "Not Found".to_string(),
            redirect: None,
            on_error: None,
            verbose: false,
        }
    }
}

impl CatchOptions {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    pub fn on_error(mut self, handler: impl Fn(&ErrorReport) -> Response + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }
}

pub struct CatchMiddleware {
    base: String,
    status: StatusCode,
    body: String,
    redirect: Option<String>,
    on_error: ErrorHandler,
    verbose: bool,
}

fn generic_failure(_report: &ErrorReport) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

impl CatchMiddleware {
    pub fn new(options: CatchOptions) -> Self {
        let base = normalize(&options.base);
        tracing::info!(base = %base, status = %options.status, "Use catch middleware for unhandled requests");
        Self {
            redirect: options.redirect.map(|url| qualify_with_base(&base, &url)),
            base,
            status: options.status,
            body: options.body,
            on_error: options.on_error.unwrap_or_else(|| Arc::new(generic_failure)),
            verbose: options.verbose,
        }
    }

    /// Replace a delegated error with the configured failure response.
    pub fn recover(&self, report: &ErrorReport) -> Response {
        (self.on_error)(report)
    }

    /// Response for a request that reached the end of the chain.
    pub fn unhandled(&self, path: &str) -> Response {
        let path = normalize(path);
        if !is_within_base(&self.base, &path) {
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
        if self.verbose {
            tracing::debug!(path = %path, "Request reached the catch stage");
        }
        match &self.redirect {
            Some(location) => response::redirect(StatusCode::MOVED_PERMANENTLY, location),
            None => (self.status, self.body.clone()).into_response(),
        }
    }
}

/// Outermost layer: observe failures delegated by inner stages.
pub async fn catch_errors(
    State(middleware): State<Arc<CatchMiddleware>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let id = request_id(&request).to_string();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => {
            tracing::error!(
                request_id = %id,
                path = %path,
                kind = report.kind,
                error = %report.message,
                "Request failed"
            );
            metrics::record_failure(report.kind);
            middleware.recover(&report)
        }
        None => response,
    }
}

/// Terminal fallback handler.
pub async fn catch_fallback(
    State(middleware): State<Arc<CatchMiddleware>>,
    request: Request<Body>,
) -> Response {
    middleware.unhandled(request.uri().path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_unhandled_under_base() {
        let middleware = CatchMiddleware::new(CatchOptions::new("/app"));
        let response = middleware.unhandled("/app/missing");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = middleware.unhandled("/elsewhere");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unhandled_redirect() {
        let middleware = CatchMiddleware::new(CatchOptions {
            redirect: Some("/".into()),
            ..CatchOptions::new("/app")
        });
        let response = middleware.unhandled("/app/missing");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/app");
    }

    #[test]
    fn test_custom_error_handler() {
        let middleware = CatchMiddleware::new(CatchOptions::new("/").on_error(|report| {
            (StatusCode::SERVICE_UNAVAILABLE, report.kind).into_response()
        }));
        let response = middleware.recover(&ErrorReport {
            kind: "preload_error",
            message: "down".into(),
        });
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

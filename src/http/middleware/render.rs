//! Render middleware: preload, discriminate, render, merge into the
//! template and send.
//!
//! # States
//! ```text
//! Entry → BaseCheck ──outside──▶ next
//!           │
//!           ▼
//!       Preloading ──error──▶ ErrorExit (catch stage)
//!           │
//!           ▼
//!     Discriminating ──Redirect──▶ 3xx + Location (base-qualified)
//!           │        ──Response──▶ body verbatim
//!           ▼
//!       Rendering ──error/panic──▶ ErrorExit
//!           │
//!           ▼
//!        Merging → Sent (200 text/html)
//! ```
//!
//! Base membership is segment-aware: a base of `/app` owns `/app` and
//! `/app/...`, never `/application`. Paths outside the base go to `next`
//! untouched.
//!
//! Only preloading suspends. Rendering and merging work on a view owned by
//! the request, so concurrent requests cannot observe each other's output.

use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use futures_util::FutureExt;

use crate::codec::{props_script, PropCodec, DEFAULT_SECRET_SALT};
use crate::error::{BoxError, RequestError, SetupError};
use crate::http::request::request_id;
use crate::http::response;
use crate::observability::metrics;
use crate::preload::{
    classify, Candidates, EmptyPreload, Helpers, Location, Preload, PreloadResult,
};
use crate::render::Component;
use crate::routing::{normalize, qualify_with_base};
use crate::template::{ContentOptions, Region, SharedTemplate, TemplateRepresentative};
use crate::Props;

/// Options for [`RenderMiddleware`]. Required: base, component, template
/// path and target selector.
#[derive(Default)]
pub struct RenderOptions {
    pub base: Option<String>,
    pub component: Option<Arc<dyn Component>>,
    pub preload: Option<Arc<dyn Preload>>,
    pub template_path: Option<PathBuf>,
    pub target_selector: Option<String>,
    /// Shared secret for the prop hand-off. Falls back to the development
    /// default, which only obfuscates.
    pub secret_salt: Option<String>,
    pub verbose: bool,
    pub debug: bool,
    /// Append the component CSS to the head as a `<style>` element.
    pub inline_css: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn component(mut self, component: impl Component) -> Self {
        self.component = Some(Arc::new(component));
        self
    }

    pub fn preload<F, Fut>(mut self, preload: F) -> Self
    where
        F: Fn(Location, Candidates, Helpers) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<PreloadResult>, BoxError>> + Send + 'static,
    {
        self.preload = Some(Arc::new(preload));
        self
    }

    pub fn preload_with(mut self, preload: impl Preload) -> Self {
        self.preload = Some(Arc::new(preload));
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn target_selector(mut self, selector: impl Into<String>) -> Self {
        self.target_selector = Some(selector.into());
        self
    }

    pub fn secret_salt(mut self, secret: impl Into<String>) -> Self {
        self.secret_salt = Some(secret.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn inline_css(mut self, inline_css: bool) -> Self {
        self.inline_css = inline_css;
        self
    }
}

/// What the render middleware decided for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Outside the base; the next stage handles the request.
    PassThrough,
    Redirect { location: String, status: StatusCode },
    Response { body: String, status: StatusCode },
    Document(String),
}

impl RenderOutcome {
    fn label(&self) -> &'static str {
        match self {
            RenderOutcome::PassThrough => "pass_through",
            RenderOutcome::Redirect { .. } => "redirect",
            RenderOutcome::Response { .. } => "response",
            RenderOutcome::Document(_) => "rendered",
        }
    }
}

/// Render stage for one mount base.
///
/// Requests whose path is not `base` itself or below it on a segment
/// boundary pass through, so `/app` ignores `/application`.
pub struct RenderMiddleware {
    base: String,
    component: Arc<dyn Component>,
    preload: Arc<dyn Preload>,
    template: SharedTemplate,
    template_path: PathBuf,
    target_selector: String,
    codec: PropCodec,
    verbose: bool,
    debug: bool,
    inline_css: bool,
}

fn required<T>(value: Option<T>, option: &'static str, reason: &'static str) -> Result<T, SetupError> {
    value.ok_or(SetupError::Configuration { option, reason })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RenderMiddleware {
    /// Validate options and load the template once.
    pub fn new(options: RenderOptions) -> Result<Self, SetupError> {
        let base = normalize(&required(
            non_empty(options.base),
            "base",
            "required to serve server side rendering results",
        )?);
        let component = required(
            options.component,
            "component",
            "pass a component built for server side rendering",
        )?;
        let template_path = required(
            options.template_path.filter(|p| !p.as_os_str().is_empty()),
            "template_path",
            "pass the path to the final index template file",
        )?;
        let target_selector = required(
            non_empty(options.target_selector),
            "target_selector",
            "pass the target html element selector",
        )?;

        let secret = match non_empty(options.secret_salt) {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    base = %base,
                    "No secret salt configured, using the development default: props are obfuscated, not confidential"
                );
                DEFAULT_SECRET_SALT.to_string()
            }
        };
        let codec = PropCodec::new(&secret)?;

        let template = TemplateRepresentative::load(&template_path, &target_selector)?;

        tracing::info!(
            base = %base,
            template = %template_path.display(),
            target = %target_selector,
            "Use render middleware to serve server side rendering results"
        );

        Ok(Self {
            base,
            component,
            preload: options.preload.unwrap_or_else(|| Arc::new(EmptyPreload)),
            template: Arc::new(ArcSwap::from_pointee(template)),
            template_path,
            target_selector,
            codec,
            verbose: options.verbose,
            debug: options.debug,
            inline_css: options.inline_css,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Template handle, for swapping in a reloaded template.
    pub fn template(&self) -> &SharedTemplate {
        &self.template
    }

    pub fn template_path(&self) -> &std::path::Path {
        &self.template_path
    }

    pub fn target_selector(&self) -> &str {
        &self.target_selector
    }

    /// Run the state machine for one request path.
    ///
    /// Returns [`RenderOutcome::PassThrough`] when `path` is outside the
    /// base by whole segments. A preload panic becomes
    /// [`RequestError::Preload`].
    pub async fn render(&self, path: &str, query: Option<&str>) -> Result<RenderOutcome, RequestError> {
        if self.verbose {
            tracing::trace!(path = %path, "Render request candidate");
        }

        // BaseCheck
        let Some(location) = Location::resolve(&self.base, path, query) else {
            if self.verbose {
                tracing::debug!(base = %self.base, "Request is outside of the base path");
            }
            return Ok(RenderOutcome::PassThrough);
        };

        // Preloading
        let preload = self.preload.preload(location.clone(), Candidates, Helpers::default());
        let result = match AssertUnwindSafe(preload)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(panic_message(panic).into()))
        {
            Ok(result) => {
                if self.verbose {
                    tracing::debug!("Preload request successfully performed");
                }
                if self.debug {
                    tracing::debug!(result = ?result, "Preload result");
                }
                classify(result)
            }
            Err(e) => {
                if self.verbose {
                    tracing::error!(error = %e, "Preload request failed");
                }
                return Err(RequestError::Preload(e));
            }
        };

        // Discriminating
        match result {
            PreloadResult::Redirect(candidate) => {
                let location = qualify_with_base(&self.base, &candidate.url);
                if self.verbose {
                    tracing::debug!(
                        url = %candidate.url,
                        status = %candidate.status,
                        redirect = %location,
                        "Preload request returned redirect, qualified with the base path"
                    );
                }
                Ok(RenderOutcome::Redirect {
                    location,
                    status: candidate.status,
                })
            }
            PreloadResult::Response(candidate) => {
                if self.verbose {
                    tracing::debug!(status = %candidate.status, "Preload request returned plain response");
                }
                Ok(RenderOutcome::Response {
                    body: candidate.body,
                    status: candidate.status,
                })
            }
            PreloadResult::Data(data) => self.render_document(&location, data).map(RenderOutcome::Document),
        }
    }

    /// Rendering and merging. Runs without suspension.
    fn render_document(&self, location: &Location, data: Props) -> Result<String, RequestError> {
        let mut props = location.to_props();
        props.extend(data);

        let rendered = match catch_unwind(AssertUnwindSafe(|| self.component.render(&props))) {
            Ok(Ok(rendered)) => rendered,
            Ok(Err(e)) => {
                if self.verbose {
                    tracing::error!(error = %e, "Render failed");
                }
                return Err(RequestError::Render(e));
            }
            Err(panic) => {
                let message = panic_message(panic);
                if self.verbose {
                    tracing::error!(error = %message, "Render panicked");
                }
                return Err(RequestError::Render(message.into()));
            }
        };

        let payload = self.codec.encode(&props)?;

        let template = self.template.load();
        let mut view = template.view();

        let mut head = format!(
            "<base href=\"{}\" />{}{}{}",
            escape_attribute(&self.base),
            props_script(&payload),
            template.original().head,
            rendered.head
        );
        if self.inline_css && !rendered.css.code.is_empty() {
            head.push_str("<style>");
            head.push_str(&rendered.css.code);
            head.push_str("</style>");
        }

        view.set_content(Region::Head, head, ContentOptions::ACTIVE);
        view.set_content(Region::Target, rendered.html, ContentOptions::ACTIVE);

        if self.verbose {
            tracing::debug!("Render successfully performed");
        }
        Ok(view.render())
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".to_string())
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Axum middleware function for a [`RenderMiddleware`].
///
/// Errors are returned, not rendered: the catch stage turns them into the
/// client-facing failure response.
pub async fn render_middleware(
    State(middleware): State<Arc<RenderMiddleware>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, RequestError> {
    let start = Instant::now();
    let id = request_id(&request).to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let outcome = match middleware.render(&path, query.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::record_render(e.kind(), start);
            tracing::debug!(request_id = %id, error = %e, "Delegating render failure to the catch stage");
            return Err(e);
        }
    };

    let label = outcome.label();
    let response = match outcome {
        RenderOutcome::PassThrough => return Ok(next.run(request).await),
        RenderOutcome::Redirect { location, status } => response::redirect(status, &location),
        RenderOutcome::Response { body, status } => response::raw(status, body),
        RenderOutcome::Document(html) => response::document(html),
    };
    metrics::record_render(label, start);
    Ok(response)
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every pipeline stage from a validated [`SsrConfig`]
//! - Start the template watcher when requested
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Stages are built in request order: static, redirects, render, catch

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use notify::RecommendedWatcher;

use crate::config::{Mode, SsrConfig};
use crate::error::SetupError;
use crate::http::middleware::{
    redirect_middleware, AssetSource, CatchMiddleware, CatchOptions, RedirectOptions,
    RenderMiddleware, RenderOptions, StaticMiddleware, StaticOptions,
};
use crate::pipeline::Pipeline;
use crate::preload::Preload;
use crate::render::Component;
use crate::routing::PathMatch;
use crate::template::{SharedTemplate, TemplateWatcher};

/// The assembled pipeline plus the handles needed to keep it fresh.
pub struct Startup {
    pub pipeline: Pipeline,
    /// Template of the render stage, with its file and selector.
    pub template: (SharedTemplate, PathBuf, String),
}

impl Startup {
    /// Start reloading the template on change. Keep the watcher alive.
    pub fn watch_template(&self) -> Result<RecommendedWatcher, notify::Error> {
        let (template, path, selector) = &self.template;
        TemplateWatcher::new(path, selector.clone(), template.clone()).run()
    }
}

fn status(code: u16, option: &'static str) -> Result<StatusCode, SetupError> {
    StatusCode::from_u16(code).map_err(|_| SetupError::Configuration {
        option,
        reason: "not a valid HTTP status",
    })
}

fn asset_source(config: &SsrConfig) -> Option<AssetSource> {
    let assets = &config.assets;
    match (config.app.mode, &assets.dev_server, &assets.directory) {
        (Mode::Development, Some(dev_server), _) => Some(AssetSource::DevServer(dev_server.clone())),
        (_, _, Some(directory)) => Some(AssetSource::Directory(PathBuf::from(directory))),
        _ => None,
    }
}

/// Build the pipeline described by `config` around `component`.
pub fn build_pipeline(
    config: &SsrConfig,
    component: Arc<dyn Component>,
    preload: Option<Arc<dyn Preload>>,
) -> Result<Startup, SetupError> {
    let app = &config.app;

    let mut catch = CatchOptions::new(app.base.clone());
    catch.status = status(config.catch.status, "catch.status")?;
    catch.body = config.catch.body.clone();
    catch.redirect = config.catch.redirect.clone();
    catch.verbose = app.verbose;
    let mut pipeline = Pipeline::new(CatchMiddleware::new(catch));

    if let Some(source) = asset_source(config) {
        pipeline = pipeline.with_static(StaticMiddleware::new(StaticOptions {
            base: app.base.clone(),
            source,
            verbose: app.verbose,
        })?);
    }

    for redirect in &config.redirects {
        let matcher = match (&redirect.exact, &redirect.pattern) {
            (Some(exact), None) => PathMatch::exact(exact),
            (None, Some(pattern)) => PathMatch::pattern(pattern)?,
            _ => {
                return Err(SetupError::Configuration {
                    option: "match",
                    reason: "exactly one of 'match' or 'pattern' is required",
                })
            }
        };
        let options = RedirectOptions {
            verbose: app.verbose,
            ..RedirectOptions::new(app.base.clone(), matcher, redirect.to.clone())
        }
        .status(status(redirect.status, "redirects.status")?);
        pipeline = pipeline.with_match(redirect_middleware(options)?);
    }

    let mut render = RenderOptions::new()
        .base(app.base.clone())
        .template_path(Path::new(&app.template_path))
        .target_selector(app.target_selector.clone())
        .verbose(app.verbose)
        .debug(app.debug)
        .inline_css(app.inline_css);
    render.component = Some(component);
    render.preload = preload;
    if let Some(secret) = &app.secret_salt {
        render = render.secret_salt(secret.clone());
    }
    let render = RenderMiddleware::new(render)?;
    let template = (
        render.template().clone(),
        render.template_path().to_path_buf(),
        render.target_selector().to_string(),
    );

    Ok(Startup {
        pipeline: pipeline.with_render(render),
        template,
    })
}

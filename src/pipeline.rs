//! Assembly of the request pipeline into an axum `Router`.
//!
//! Requests flow Static → Match/Redirect (in insertion order) → Render (in
//! insertion order) → Catch. The catch stage also wraps the whole chain to
//! receive errors delegated by the render stages.

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};

use crate::http::middleware::{
    catch_errors, catch_fallback, match_middleware, render_middleware, static_middleware,
    CatchMiddleware, CatchOptions, MatchMiddleware, RenderMiddleware, StaticMiddleware,
};

pub struct Pipeline {
    static_assets: Option<Arc<StaticMiddleware>>,
    matches: Vec<Arc<MatchMiddleware>>,
    renders: Vec<Arc<RenderMiddleware>>,
    catch: Arc<CatchMiddleware>,
}

impl Pipeline {
    pub fn new(catch: CatchMiddleware) -> Self {
        Self {
            static_assets: None,
            matches: Vec::new(),
            renders: Vec::new(),
            catch: Arc::new(catch),
        }
    }

    pub fn with_static(mut self, middleware: StaticMiddleware) -> Self {
        self.static_assets = Some(Arc::new(middleware));
        self
    }

    /// Add a match middleware (redirects are match middlewares too).
    pub fn with_match(mut self, middleware: MatchMiddleware) -> Self {
        self.matches.push(Arc::new(middleware));
        self
    }

    pub fn with_render(mut self, middleware: RenderMiddleware) -> Self {
        self.renders.push(Arc::new(middleware));
        self
    }

    pub fn renders(&self) -> &[Arc<RenderMiddleware>] {
        &self.renders
    }

    pub fn into_router(self) -> Router {
        let mut router = Router::new()
            .fallback(catch_fallback)
            .with_state(self.catch.clone());

        // Layers added later run earlier, so build from the inside out.
        for render in self.renders.into_iter().rev() {
            router = router.layer(from_fn_with_state(render, render_middleware));
        }
        for matcher in self.matches.into_iter().rev() {
            router = router.layer(from_fn_with_state(matcher, match_middleware));
        }
        if let Some(static_assets) = self.static_assets {
            router = router.layer(from_fn_with_state(static_assets, static_middleware));
        }
        router.layer(from_fn_with_state(self.catch, catch_errors))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(CatchMiddleware::new(CatchOptions::default()))
    }
}

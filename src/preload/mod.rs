//! Preload subsystem.
//!
//! # Data Flow
//! ```text
//! Request under base
//!     → location.rs (base, path, inner, query)
//!     → Preload::preload(location, candidates, helpers)   [suspends]
//!     → result.rs (classify: Data | Redirect | Response)
//! ```
//!
//! # Design Decisions
//! - Preload is the only suspension point of a render
//! - Callbacks return `Option<PreloadResult>`; `None` is empty data
//! - No cancellation: a preload started for a request runs to completion

pub mod location;
pub mod result;

use std::future::Future;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::error::BoxError;

pub use location::{Location, Query, QueryValue};
pub use result::{
    classify, Candidates, Helpers, PreloadResult, RedirectCandidate, ResponseCandidate, ResultKind,
};

/// Future returned by a preload callback.
pub type PreloadFuture = BoxFuture<'static, Result<Option<PreloadResult>, BoxError>>;

/// Per-route data loader run before rendering.
pub trait Preload: Send + Sync + 'static {
    fn preload(&self, location: Location, candidates: Candidates, helpers: Helpers) -> PreloadFuture;
}

impl<F, Fut> Preload for F
where
    F: Fn(Location, Candidates, Helpers) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<PreloadResult>, BoxError>> + Send + 'static,
{
    fn preload(&self, location: Location, candidates: Candidates, helpers: Helpers) -> PreloadFuture {
        self(location, candidates, helpers).boxed()
    }
}

/// Default preload: resolves immediately with no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPreload;

impl Preload for EmptyPreload {
    fn preload(&self, _location: Location, _candidates: Candidates, _helpers: Helpers) -> PreloadFuture {
        future::ready(Ok(None)).boxed()
    }
}

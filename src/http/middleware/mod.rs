//! Pipeline stages as axum middleware.
//!
//! # Data Flow
//! ```text
//! catch_errors (outermost, consumes ErrorReport)
//!     → static_files.rs (asset or fall through)
//!     → redirect.rs (declarative redirects, built on matching.rs)
//!     → render.rs (preload → render → merge)
//!     → catch_fallback (terminal)
//! ```
//!
//! # Design Decisions
//! - Every stage delegates with `next.run(request)` when it does not apply
//! - Stages are built once from validated options and shared via Arc
//! - Request failures travel outward as an `ErrorReport` response extension

pub mod catch;
pub mod matching;
pub mod redirect;
pub mod render;
pub mod static_files;

pub use catch::{catch_errors, catch_fallback, CatchMiddleware, CatchOptions, ErrorHandler};
pub use matching::{match_middleware, MatchDecision, MatchMiddleware, MatchOptions};
pub use redirect::{redirect_middleware, RedirectOptions};
pub use render::{render_middleware, RenderMiddleware, RenderOptions, RenderOutcome};
pub use static_files::{static_middleware, AssetSource, StaticMiddleware, StaticOptions};

//! HTML template subsystem.
//!
//! # Data Flow
//! ```text
//! Setup:
//!     template file
//!     → representative.rs (read, locate head + target once)
//!     → TemplateRepresentative (immutable, shared via Arc)
//!
//! Per request:
//!     TemplateRepresentative::view()
//!     → TemplateView::set_content(Head | Target, ...)
//!     → TemplateView::render() → response body
//! ```
//!
//! # Design Decisions
//! - Parsing happens once; requests only splice strings
//! - Each request owns its view, no shared mutable document
//! - Selectors limited to tag / #id / .class compounds
//! - Development mode may swap the template atomically on file change

pub mod representative;
pub mod scan;
pub mod selector;
pub mod watcher;

use std::sync::Arc;

use arc_swap::ArcSwap;

pub use representative::{ContentOptions, Original, Region, TemplateRepresentative, TemplateView};
pub use selector::Selector;
pub use watcher::TemplateWatcher;

/// Template handle shared by a render middleware and its watcher.
pub type SharedTemplate = Arc<ArcSwap<TemplateRepresentative>>;

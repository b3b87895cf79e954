//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → path.rs (normalize, base membership, strip base)
//!     → matcher.rs (evaluate remainder against literal or pattern)
//!     → Return: matched or pass-through
//!
//! Redirect qualification:
//!     route-relative url
//!     → path.rs (qualify with base)
//!     → Location header
//! ```
//!
//! # Design Decisions
//! - Matchers compiled at startup, immutable at runtime
//! - Paths outside the base are never an error, only a pass-through
//! - Deterministic: same input always produces the same decision

pub mod matcher;
pub mod path;

pub use matcher::PathMatch;
pub use path::{is_within_base, normalize, normalize_with_base, qualify_with_base};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All pipeline stages produce:
//!     → tracing events (logging.rs installs the subscriber)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log lines
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all stages via the `x-request-id` header
//! - Per-request diagnostics are opt-in through each stage's `verbose` flag

pub mod logging;
pub mod metrics;

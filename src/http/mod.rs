//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, request ID, tracing)
//!     → request.rs (request ID helpers)
//!     → middleware/ (static → redirect → render → catch)
//!     → response.rs (redirect, raw and document responses)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::SsrServer;

//! Server side rendering request pipeline.
//!
//! ```text
//!   request ─▶ static ─▶ redirect* ─▶ render ─▶ catch (fallback)
//!                                       │
//!                       preload ─▶ discriminate ─▶ render ─▶ merge
//!                                                            │
//!   response ◀── template + encrypted props ◀────────────────┘
//! ```
//!
//! The browser side ([`client::hydrate`]) decodes the props embedded in the
//! page and remounts the component with them.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod preload;
pub mod render;
pub mod routing;
pub mod template;

/// Props passed to components and carried to the client.
pub type Props = serde_json::Map<String, serde_json::Value>;

pub use config::SsrConfig;
pub use error::{BoxError, CodecError, HydrateError, RequestError, SetupError};
pub use http::SsrServer;
pub use lifecycle::Shutdown;
pub use pipeline::Pipeline;
pub use preload::{Candidates, Helpers, Location, Preload, PreloadResult};
pub use render::{AppShell, Component, RenderedOutput};

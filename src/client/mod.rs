//! Client hydration renderer.
//!
//! The counterpart of the render stage: read the encrypted props the server
//! embedded in the page, overlay caller props, and mount the component into
//! the target element with the result.

pub mod document;
pub mod hydrate;

pub use document::{HostDocument, HtmlDocument};
pub use hydrate::{hydrate, ClientComponent, HydrateOptions};

//! Component rendering capability.
//!
//! The rendering engine itself is external; the pipeline only needs
//! `render(props) -> { head, html, css }`.

use serde::{Deserialize, Serialize};

use crate::error::BoxError;
use crate::Props;

/// CSS produced by a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Css {
    pub code: String,
}

/// Markup fragments produced by a component render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOutput {
    pub head: String,
    pub html: String,
    pub css: Css,
}

impl RenderedOutput {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = head.into();
        self
    }

    pub fn with_css(mut self, code: impl Into<String>) -> Self {
        self.css.code = code.into();
        self
    }
}

/// A server-side renderable component.
pub trait Component: Send + Sync + 'static {
    fn render(&self, props: &Props) -> Result<RenderedOutput, BoxError>;
}

impl<F> Component for F
where
    F: Fn(&Props) -> Result<RenderedOutput, BoxError> + Send + Sync + 'static,
{
    fn render(&self, props: &Props) -> Result<RenderedOutput, BoxError> {
        self(props)
    }
}

/// Component that renders no markup.
///
/// The page is the template plus the encrypted props; the client bundle
/// mounts the application on hydration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppShell;

impl Component for AppShell {
    fn render(&self, _props: &Props) -> Result<RenderedOutput, BoxError> {
        Ok(RenderedOutput::default())
    }
}

//! Host document abstraction for hydration.

use regex::Regex;

use crate::template::scan::find_element;
use crate::template::Selector;

/// The page a component is mounted into.
///
/// A browser binding implements this over the live DOM; [`HtmlDocument`]
/// implements it over server-rendered markup.
pub trait HostDocument {
    /// String value of the page global `name`, if set.
    fn global(&self, name: &str) -> Option<String>;

    fn contains(&self, target: &Selector) -> bool;

    /// Remove the content of the first element matching `target`.
    fn clear(&mut self, target: &Selector) -> bool;

    /// Replace the content of the first element matching `target`.
    fn set_inner(&mut self, target: &Selector, html: &str) -> bool;
}

/// In-memory document over an HTML string.
///
/// Globals are read from `window.<name> = "<value>";` assignments in the
/// markup, which is how the render stage embeds the prop payload.
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Content of the first element matching `target`.
    pub fn inner_html(&self, target: &Selector) -> Option<&str> {
        find_element(&self.html, target).map(|element| &self.html[element.inner])
    }
}

impl HostDocument for HtmlDocument {
    fn global(&self, name: &str) -> Option<String> {
        let pattern = format!(r#"window\.{}\s*=\s*"([^"]*)""#, regex::escape(name));
        let assignment = Regex::new(&pattern).ok()?;
        assignment
            .captures(&self.html)
            .and_then(|caps| caps.get(1))
            .map(|value| value.as_str().to_string())
    }

    fn contains(&self, target: &Selector) -> bool {
        find_element(&self.html, target).is_some()
    }

    fn clear(&mut self, target: &Selector) -> bool {
        self.set_inner(target, "")
    }

    fn set_inner(&mut self, target: &Selector, html: &str) -> bool {
        match find_element(&self.html, target) {
            Some(element) => {
                self.html.replace_range(element.inner, html);
                true
            }
            None => false,
        }
    }
}

//! Parsed HTML template with handles on its head and target regions.
//!
//! The document is parsed once. The original head and target content stay
//! read-only for the template's lifetime; every request works on its own
//! [`TemplateView`], so concurrent requests never share mutable state.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SetupError;
use crate::template::scan::find_element;
use crate::template::selector::Selector;

static SCRIPT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<script\b[^>]*>).*?(</script\s*>)").expect("script pattern is valid")
});

static STYLE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<style\b[^>]*>).*?(</style\s*>)").expect("style pattern is valid")
});

/// Region of the document a view can rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Head,
    Target,
}

/// Whether `<script>` and `<style>` bodies stay active in inserted markup.
///
/// With a flag unset the element is kept but its body is dropped, the way a
/// plain structural assignment leaves such elements inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentOptions {
    pub script: bool,
    pub style: bool,
}

impl ContentOptions {
    pub const ACTIVE: Self = Self {
        script: true,
        style: true,
    };
}

/// Read-only content of the template as loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Original<'t> {
    pub head: &'t str,
    pub target: &'t str,
}

/// Template parsed once at middleware setup.
#[derive(Debug, Clone)]
pub struct TemplateRepresentative {
    path: PathBuf,
    selector: Selector,
    source: String,
    head: Range<usize>,
    target: Range<usize>,
}

impl TemplateRepresentative {
    /// Read and parse the template at `path`.
    pub fn load(path: impl AsRef<Path>, target_selector: &str) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SetupError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, source, target_selector)
    }

    /// Parse template `source`; `path` is only used in errors.
    pub fn parse(
        path: impl Into<PathBuf>,
        source: String,
        target_selector: &str,
    ) -> Result<Self, SetupError> {
        let path = path.into();
        let selector = Selector::parse(target_selector)?;

        let head_selector = Selector::parse("head")?;
        let head = find_element(&source, &head_selector)
            .ok_or_else(|| SetupError::TemplateTargetNotFound {
                path: path.clone(),
                selector: "head".to_string(),
            })?
            .inner;
        let target = find_element(&source, &selector)
            .ok_or_else(|| SetupError::TemplateTargetNotFound {
                path: path.clone(),
                selector: selector.to_string(),
            })?
            .inner;

        let overlapping = (head.start < target.end && target.start < head.end)
            || (head.is_empty() && target.contains(&head.start))
            || (target.is_empty() && head.contains(&target.start));
        if overlapping {
            return Err(SetupError::InvalidTemplate {
                path,
                reason: format!("target '{}' overlaps the document head", selector),
            });
        }

        Ok(Self {
            path,
            selector,
            source,
            head,
            target,
        })
    }

    pub fn original(&self) -> Original<'_> {
        Original {
            head: &self.source[self.head.clone()],
            target: &self.source[self.target.clone()],
        }
    }

    /// Fresh per-request view, initially identical to the original.
    pub fn view(&self) -> TemplateView<'_> {
        let original = self.original();
        TemplateView {
            template: self,
            head: Cow::Borrowed(original.head),
            target: Cow::Borrowed(original.target),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// Mutable per-request view over a template.
#[derive(Debug, Clone)]
pub struct TemplateView<'t> {
    template: &'t TemplateRepresentative,
    head: Cow<'t, str>,
    target: Cow<'t, str>,
}

impl<'t> TemplateView<'t> {
    pub fn content(&self, region: Region) -> &str {
        match region {
            Region::Head => &self.head,
            Region::Target => &self.target,
        }
    }

    /// Replace the inner content of `region`.
    pub fn set_content(&mut self, region: Region, html: impl Into<String>, options: ContentOptions) {
        let mut html = html.into();
        if !options.script {
            html = SCRIPT_BODY.replace_all(&html, "$1$2").into_owned();
        }
        if !options.style {
            html = STYLE_BODY.replace_all(&html, "$1$2").into_owned();
        }
        match region {
            Region::Head => self.head = Cow::Owned(html),
            Region::Target => self.target = Cow::Owned(html),
        }
    }

    /// Serialize the whole document.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TemplateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = &self.template.source;
        let (head, target) = (&self.template.head, &self.template.target);

        let mut regions = [(head, self.head.as_ref()), (target, self.target.as_ref())];
        regions.sort_by_key(|(range, _)| range.start);

        let mut cursor = 0;
        for (range, content) in regions {
            f.write_str(&source[cursor..range.start])?;
            f.write_str(content)?;
            cursor = range.end;
        }
        f.write_str(&source[cursor..])
    }
}

//! Element location inside an HTML document.
//!
//! Only what merging needs: find the first element matching a selector and
//! the byte range of its inner content. Comments, doctypes and raw-text
//! elements (`script`, `style`, `textarea`, `title`) are skipped so markup
//! inside them never matches.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::template::selector::Selector;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("tag pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/"'>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("attribute pattern is valid")
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// A located element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Byte range of the element's inner content.
    pub inner: Range<usize>,
}

struct Tag<'h> {
    start: usize,
    end: usize,
    closing: bool,
    name: String,
    attributes: &'h str,
}

impl<'h> Tag<'h> {
    fn from_captures(caps: &Captures<'h>) -> Option<Self> {
        let whole = caps.get(0)?;
        let name = caps.get(2)?;
        Some(Self {
            start: whole.start(),
            end: whole.end(),
            closing: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
            name: name.as_str().to_ascii_lowercase(),
            attributes: caps.get(3).map_or("", |m| m.as_str()),
        })
    }

    fn self_closing(&self) -> bool {
        self.attributes.trim_end().ends_with('/')
    }

    fn has_no_content(&self) -> bool {
        self.self_closing() || VOID_ELEMENTS.contains(&self.name.as_str())
    }

    fn attribute(&self, wanted: &str) -> Option<&'h str> {
        ATTRIBUTE.captures_iter(self.attributes).find_map(|caps| {
            let name = caps.get(1)?.as_str();
            if !name.eq_ignore_ascii_case(wanted) {
                return None;
            }
            Some(
                caps.get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map_or("", |m| m.as_str()),
            )
        })
    }
}

/// Find the first element matching `selector`.
pub fn find_element(html: &str, selector: &Selector) -> Option<Element> {
    let mut pos = 0;
    while let Some(caps) = TAG.captures_at(html, pos) {
        let Some(tag) = Tag::from_captures(&caps) else {
            pos = caps.get(0).map_or(html.len(), |m| m.end());
            continue;
        };
        pos = tag.end;
        if tag.closing {
            continue;
        }

        let matched = selector.matches(&tag.name, |name| tag.attribute(name));

        if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.self_closing() {
            let (close_start, close_end) =
                find_raw_close(html, tag.end, &tag.name).unwrap_or((html.len(), html.len()));
            if matched {
                return Some(Element {
                    name: tag.name,
                    inner: tag.end..close_start,
                });
            }
            pos = close_end;
            continue;
        }

        if matched {
            let inner = if tag.has_no_content() {
                tag.end..tag.end
            } else {
                tag.end..find_close(html, tag.end, &tag.name).unwrap_or(html.len())
            };
            return Some(Element {
                name: tag.name,
                inner,
            });
        }
    }
    None
}

/// Start offset of the tag closing an element named `name` opened before `from`.
fn find_close(html: &str, from: usize, name: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;
    while let Some(caps) = TAG.captures_at(html, pos) {
        let Some(tag) = Tag::from_captures(&caps) else {
            pos = caps.get(0).map_or(html.len(), |m| m.end());
            continue;
        };
        pos = tag.end;

        if !tag.closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.self_closing() {
            pos = find_raw_close(html, tag.end, &tag.name).map_or(html.len(), |(_, end)| end);
            continue;
        }
        if tag.name != name {
            continue;
        }
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return Some(tag.start);
            }
        } else if !tag.has_no_content() {
            depth += 1;
        }
    }
    None
}

/// Locate `</name>` after `from`, ignoring case. Returns its start and end.
fn find_raw_close(html: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let needle = format!("</{}", name);
    let haystack = html[from..].to_ascii_lowercase();
    let mut search = 0;
    while let Some(offset) = haystack[search..].find(&needle) {
        let start = search + offset;
        let after = start + needle.len();
        // `</scripts>` is not a close of `script`
        match haystack[after..].chars().next() {
            Some(c) if c == '>' || c.is_ascii_whitespace() || c == '/' => {
                let end = haystack[after..].find('>').map_or(haystack.len(), |i| after + i + 1);
                return Some((from + start, from + end));
            }
            None => return Some((from + start, html.len())),
            _ => search = after,
        }
    }
    None
}

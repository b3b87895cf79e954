//! Simple element selectors: `tag`, `#id`, `.class` and compounds of them
//! such as `div#app.root`.

use std::fmt;
use std::str::FromStr;

use crate::error::SetupError;

/// A compound selector matching a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, SetupError> {
        let invalid = || SetupError::InvalidSelector(raw.to_string());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut tag = None;
        let mut id = None;
        let mut classes = Vec::new();

        let tag_len = trimmed
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(trimmed.len());
        if tag_len > 0 {
            tag = Some(trimmed[..tag_len].to_ascii_lowercase());
        }

        let mut rest = &trimmed[tag_len..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
            if len == 0 {
                return Err(invalid());
            }
            let name = body[..len].to_string();
            match marker {
                '#' if id.is_none() => id = Some(name),
                '.' => classes.push(name),
                _ => return Err(invalid()),
            }
            rest = &body[len..];
        }

        Ok(Self {
            raw: trimmed.to_string(),
            tag,
            id,
            classes,
        })
    }

    /// Test an element given its lowercase tag name and attribute lookup.
    pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag {
            if expected != tag {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if attribute("id") != Some(expected.as_str()) {
                return false;
            }
        }
        if self.classes.is_empty() {
            return true;
        }
        let class_list = attribute("class").unwrap_or("");
        self.classes
            .iter()
            .all(|class| class_list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl FromStr for Selector {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> + 'a {
        move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    #[test]
    fn test_id_selector() {
        let selector = Selector::parse("#app").unwrap();
        assert!(selector.matches("div", attrs(&[("id", "app")])));
        assert!(!selector.matches("div", attrs(&[("id", "other")])));
        assert!(!selector.matches("div", attrs(&[])));
    }

    #[test]
    fn test_compound_selector() {
        let selector = Selector::parse("main#app.root.dark").unwrap();
        assert!(selector.matches("main", attrs(&[("id", "app"), ("class", "dark root")])));
        assert!(!selector.matches("div", attrs(&[("id", "app"), ("class", "dark root")])));
        assert!(!selector.matches("main", attrs(&[("id", "app"), ("class", "root")])));
    }

    #[test]
    fn test_tag_selector_is_case_insensitive() {
        let selector = Selector::parse("BODY").unwrap();
        assert!(selector.matches("body", attrs(&[])));
    }

    #[test]
    fn test_unsupported_selectors() {
        for raw in ["", "   ", "div > p", "#", "a,b", "#a#b", "[data-x]", "div:first-child"] {
            assert!(Selector::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}

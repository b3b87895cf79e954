//! Request location handed to preload callbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::path::{is_within_base, normalize};
use crate::Props;

/// A single query parameter value, or all values of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

pub type Query = BTreeMap<String, QueryValue>;

/// Where a request landed, relative to the mount base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Normalized mount base.
    pub base: String,
    /// Normalized full request path.
    pub path: String,
    /// `path` with `base` removed, re-normalized.
    pub inner: String,
    pub query: Query,
}

impl Location {
    /// Build a location for `raw_path` under `base`.
    ///
    /// Returns `None` if the path is outside the base.
    pub fn resolve(base: &str, raw_path: &str, raw_query: Option<&str>) -> Option<Self> {
        let base = normalize(base);
        let path = normalize(raw_path);
        if !is_within_base(&base, &path) {
            return None;
        }
        let inner = if base == "/" {
            path.clone()
        } else {
            normalize(&path[base.len()..])
        };
        Some(Self {
            base,
            path,
            inner,
            query: raw_query.map(parse_query).unwrap_or_default(),
        })
    }

    /// Location fields as render props.
    pub fn to_props(&self) -> Props {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Props::new(),
        }
    }
}

/// Parse a url-encoded query string; repeated keys collect into a list.
pub fn parse_query(raw: &str) -> Query {
    let mut query = Query::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let value = value.into_owned();
        match query.remove(key.as_ref()) {
            None => {
                query.insert(key.into_owned(), QueryValue::One(value));
            }
            Some(QueryValue::One(first)) => {
                query.insert(key.into_owned(), QueryValue::Many(vec![first, value]));
            }
            Some(QueryValue::Many(mut values)) => {
                values.push(value);
                query.insert(key.into_owned(), QueryValue::Many(values));
            }
        }
    }
    query
}

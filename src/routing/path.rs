//! Path normalization relative to a mount base.
//!
//! # Responsibilities
//! - Canonicalize request paths (one leading slash, no trailing slash)
//! - Strip a base path from a request path
//! - Re-qualify a base-relative path against the base
//!
//! # Design Decisions
//! - Empty segments collapse, so `//a///b/` becomes `/a/b`
//! - Base membership is segment-aware: `/app` owns `/app` and `/app/x`
//!   but not `/application`

/// Canonicalize a raw path.
///
/// The result always starts with exactly one `/` and never ends with one,
/// except for the root path which normalizes to `/`.
pub fn normalize(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len() + 1);
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Returns true if the normalized `path` lives under the normalized `base`.
pub fn is_within_base(base: &str, path: &str) -> bool {
    if base == "/" {
        return true;
    }
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Compute `path` relative to `base`.
///
/// Both inputs are normalized first. Returns `None` when `path` is outside
/// `base`; callers are expected to treat that as a pass-through.
pub fn normalize_with_base(base: &str, path: &str) -> Option<String> {
    let base = normalize(base);
    let path = normalize(path);
    if !is_within_base(&base, &path) {
        return None;
    }
    if base == "/" {
        return Some(path);
    }
    Some(normalize(&path[base.len()..]))
}

/// Qualify a base-relative `path` with `base`.
///
/// Absolute URLs (`scheme://...` or protocol-relative `//host`) are returned
/// untouched since they do not live under any mount base.
pub fn qualify_with_base(base: &str, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    let base = normalize(base);
    let (path, query) = match path.find(['?', '#']) {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    };
    let joined = if base == "/" {
        normalize(path)
    } else {
        normalize(&format!("{}/{}", base, path))
    };
    format!("{}{}", joined, query)
}

fn is_absolute_url(path: &str) -> bool {
    if path.starts_with("//") {
        return true;
    }
    match path.find("://") {
        Some(idx) => path[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        None => false,
    }
}

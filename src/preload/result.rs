//! Preload outcomes and their builders.
//!
//! A preload callback either supplies data for the render or short-circuits
//! into a redirect or a raw response. The outcome is an explicit enum, so a
//! data field named `url` or `body` can never be mistaken for a candidate.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::Props;

pub const DEFAULT_REDIRECT_STATUS: StatusCode = StatusCode::MOVED_PERMANENTLY;
pub const DEFAULT_RESPONSE_STATUS: StatusCode = StatusCode::OK;

/// Redirect candidate. `url` is relative to the mount base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectCandidate {
    pub url: String,
    pub status: StatusCode,
}

/// Terminal response candidate, sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCandidate {
    pub body: String,
    pub status: StatusCode,
}

/// Outcome of a preload callback.
#[derive(Debug, Clone, PartialEq)]
pub enum PreloadResult {
    Data(Props),
    Redirect(RedirectCandidate),
    Response(ResponseCandidate),
}

/// Which variant a result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Data,
    Redirect,
    Response,
}

impl PreloadResult {
    /// Redirect to a base-relative url with the default 301 status.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect(RedirectCandidate {
            url: url.into(),
            status: DEFAULT_REDIRECT_STATUS,
        })
    }

    /// Raw response with the default 200 status.
    pub fn response(body: impl Into<String>) -> Self {
        Self::Response(ResponseCandidate {
            body: body.into(),
            status: DEFAULT_RESPONSE_STATUS,
        })
    }

    /// Data from anything serializable to a JSON object.
    pub fn data<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from_json)
    }

    /// Override the status of a redirect or response. Data is unaffected.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        match &mut self {
            PreloadResult::Redirect(candidate) => candidate.status = status,
            PreloadResult::Response(candidate) => candidate.status = status,
            PreloadResult::Data(_) => {}
        }
        self
    }

    /// Wrap plain JSON as data.
    ///
    /// Objects become the field mapping; any other value carries no fields.
    /// JSON never produces a candidate, whatever its keys are.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Data(map),
            _ => Self::Data(Props::new()),
        }
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            PreloadResult::Data(_) => ResultKind::Data,
            PreloadResult::Redirect(_) => ResultKind::Redirect,
            PreloadResult::Response(_) => ResultKind::Response,
        }
    }
}

impl Default for PreloadResult {
    fn default() -> Self {
        Self::Data(Props::new())
    }
}

impl From<Props> for PreloadResult {
    fn from(props: Props) -> Self {
        Self::Data(props)
    }
}

impl From<Value> for PreloadResult {
    fn from(value: Value) -> Self {
        Self::from_json(value)
    }
}

impl From<RedirectCandidate> for PreloadResult {
    fn from(candidate: RedirectCandidate) -> Self {
        Self::Redirect(candidate)
    }
}

impl From<ResponseCandidate> for PreloadResult {
    fn from(candidate: ResponseCandidate) -> Self {
        Self::Response(candidate)
    }
}

/// Total classification of a possibly absent preload result.
///
/// An absent result is empty data.
pub fn classify(result: Option<PreloadResult>) -> PreloadResult {
    result.unwrap_or_default()
}

/// Result builders passed to preload callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Candidates;

impl Candidates {
    pub fn redirect(&self, url: impl Into<String>) -> PreloadResult {
        PreloadResult::redirect(url)
    }

    pub fn redirect_with_status(&self, url: impl Into<String>, status: StatusCode) -> PreloadResult {
        PreloadResult::redirect(url).with_status(status)
    }

    pub fn response(&self, body: impl Into<String>) -> PreloadResult {
        PreloadResult::response(body)
    }

    pub fn response_with_status(&self, body: impl Into<String>, status: StatusCode) -> PreloadResult {
        PreloadResult::response(body).with_status(status)
    }

    /// Resolve arbitrary JSON into a result (always data).
    pub fn resolve(&self, value: Value) -> PreloadResult {
        PreloadResult::from_json(value)
    }
}

/// The same builders under named keys.
#[derive(Debug, Clone, Copy)]
pub struct Helpers {
    pub redirect: fn(&str, Option<StatusCode>) -> PreloadResult,
    pub response: fn(&str, Option<StatusCode>) -> PreloadResult,
}

impl Default for Helpers {
    fn default() -> Self {
        Self {
            redirect: |url, status| {
                PreloadResult::redirect(url).with_status(status.unwrap_or(DEFAULT_REDIRECT_STATUS))
            },
            response: |body, status| {
                PreloadResult::response(body).with_status(status.unwrap_or(DEFAULT_RESPONSE_STATUS))
            },
        }
    }
}

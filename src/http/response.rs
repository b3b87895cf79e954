//! Response construction for terminal pipeline outcomes.
//!
//! # Responsibilities
//! - Redirects with arbitrary status codes (axum's `Redirect` only covers
//!   303/307/308)
//! - Raw preload responses sent verbatim
//! - Rendered documents as `text/html`
//!
//! # Design Decisions
//! - Redirect targets are percent-encoded; existing `%XX` escapes are kept
//! - Header values that cannot be encoded degrade to a 500, never a panic

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped in a `Location` header, on top of controls and non-ASCII.
const LOCATION: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// Redirect to `location` with `status`.
pub fn redirect(status: StatusCode, location: &str) -> Response {
    let location = utf8_percent_encode(location, LOCATION).to_string();
    match HeaderValue::from_str(&location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => {
            tracing::error!(location = %location, "Redirect location is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Body sent verbatim with `status`.
pub fn raw(status: StatusCode, body: impl Into<String>) -> Response {
    let mut response = Response::new(Body::from(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

/// Rendered HTML document with status 200.
pub fn document(html: String) -> Response {
    raw(StatusCode::OK, html)
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub const TEMPLATE: &str = concat!(
    "<!DOCTYPE html><html><head><title>App</title></head>",
    "<body><div id=\"app\"><p>loading</p></div><script src=\"/app/client.js\"></script></body></html>"
);

/// Write `html` to a temporary template file.
pub fn template_file(html: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(html.as_bytes()).unwrap();
    file
}

/// Send a GET request through `router`.
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

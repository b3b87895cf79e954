//! Static middleware: serve built client assets, or proxy them to the
//! client development server.
//!
//! Only `GET` and `HEAD` are considered. Anything the asset source answers
//! with 404 falls through to the next stage, so the asset layer can sit in
//! front of the render stage without knowing its routes.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        Method, Request, StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::SetupError;
use crate::routing::{normalize, normalize_with_base};

/// Where assets come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Built client asset directory.
    Directory(PathBuf),
    /// Client development server, `host:port`.
    DevServer(String),
}

#[derive(Debug, Clone)]
pub struct StaticOptions {
    pub base: String,
    pub source: AssetSource,
    pub verbose: bool,
}

enum Source {
    Directory(ServeDir),
    DevServer {
        authority: Authority,
        client: Client<HttpConnector, Body>,
    },
}

pub struct StaticMiddleware {
    base: String,
    source: Source,
    verbose: bool,
}

impl StaticMiddleware {
    pub fn new(options: StaticOptions) -> Result<Self, SetupError> {
        let base = normalize(&options.base);
        let source = match options.source {
            AssetSource::Directory(dir) => {
                if dir.as_os_str().is_empty() {
                    return Err(SetupError::Configuration {
                        option: "directory",
                        reason: "pass the built client asset directory",
                    });
                }
                tracing::info!(base = %base, directory = %dir.display(), "Use static middleware to serve files");
                Source::Directory(ServeDir::new(dir).append_index_html_on_directories(false))
            }
            AssetSource::DevServer(address) => {
                let authority = Authority::from_str(&address).map_err(|_| SetupError::Configuration {
                    option: "dev_server",
                    reason: "client development server address must be host:port",
                })?;
                tracing::info!(base = %base, dev_server = %authority, "Use static middleware to proxy the client development server");
                let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
                Source::DevServer { authority, client }
            }
        };

        Ok(Self {
            base,
            source,
            verbose: options.verbose,
        })
    }

    pub async fn handle(&self, request: Request<Body>, next: Next) -> Response {
        if request.method() != Method::GET && request.method() != Method::HEAD {
            return next.run(request).await;
        }
        let Some(inner) = normalize_with_base(&self.base, request.uri().path()) else {
            return next.run(request).await;
        };

        let path_and_query = match request.uri().query() {
            Some(query) => format!("{}?{}", inner, query),
            None => inner,
        };

        let Some(forwarded) = self.forwarded(&request, &path_and_query) else {
            return next.run(request).await;
        };

        let response = match self.fetch(forwarded).await {
            Some(response) if response.status() != StatusCode::NOT_FOUND => response,
            _ => return next.run(request).await,
        };

        if self.verbose {
            tracing::trace!(path = %request.uri().path(), status = %response.status(), "Served static asset");
        }
        response
    }

    /// Request for `path_and_query` aimed at the asset source.
    fn forwarded(&self, request: &Request<Body>, path_and_query: &str) -> Option<Request<Body>> {
        let path_and_query = PathAndQuery::from_str(path_and_query).ok()?;
        let uri = match &self.source {
            Source::Directory(_) => Uri::builder().path_and_query(path_and_query).build().ok()?,
            Source::DevServer { authority, .. } => Uri::builder()
                .scheme(Scheme::HTTP)
                .authority(authority.clone())
                .path_and_query(path_and_query)
                .build()
                .ok()?,
        };
        forwarded_request(request, uri)
    }

    /// Ask the asset source. `None` when it is unreachable.
    async fn fetch(&self, forwarded: Request<Body>) -> Option<Response> {
        match &self.source {
            Source::Directory(serve_dir) => match serve_dir.clone().oneshot(forwarded).await {
                Ok(response) => Some(response.map(Body::new)),
                Err(never) => match never {},
            },
            Source::DevServer { authority, client } => match client.request(forwarded).await {
                Ok(response) => {
                    let (parts, body) = response.into_parts();
                    Some(Response::from_parts(parts, Body::new(body)).into_response())
                }
                Err(e) => {
                    tracing::warn!(dev_server = %authority, error = %e, "Client development server unreachable");
                    None
                }
            },
        }
    }
}

/// Body-less copy of `request` aimed at `uri`.
fn forwarded_request(request: &Request<Body>, uri: Uri) -> Option<Request<Body>> {
    let mut builder = Request::builder()
        .method(request.method().clone())
        .version(request.version())
        .uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in request.headers() {
            if name != header::HOST {
                headers.append(name.clone(), value.clone());
            }
        }
    }
    builder.body(Body::empty()).ok()
}

/// Axum middleware function for a [`StaticMiddleware`].
pub async fn static_middleware(
    State(middleware): State<Arc<StaticMiddleware>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    middleware.handle(request, next).await
}

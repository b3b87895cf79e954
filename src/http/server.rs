//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the assembled pipeline router with the server-wide layers
//!   (request timeout, request ID, tracing)
//! - Bind the router to a listener
//! - Drain in-flight requests on shutdown

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::SsrConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;
use crate::pipeline::Pipeline;

/// HTTP server for the rendering pipeline.
pub struct SsrServer {
    router: Router,
    config: SsrConfig,
}

impl SsrServer {
    /// Create a new HTTP server around an assembled pipeline.
    pub fn new(pipeline: Pipeline, config: SsrConfig) -> Self {
        let router = Self::build_router(&config, pipeline.into_router());
        Self { router, config }
    }

    /// Add the server-wide middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SsrConfig, router: Router) -> Router {
        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires or the process is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base = %self.config.app.base,
            mode = ?self.config.app.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {}
                    _ = shutdown_signal() => {}
                }
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SsrConfig {
        &self.config
    }
}

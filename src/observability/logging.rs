//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level so a single run can be turned
//! up without editing the config file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a config level is available.
pub const DEFAULT_FILTER: &str = "ssr_pipeline=info,tower_http=info";

/// Filter directives for a configured level such as `debug`.
pub fn filter_for(log_level: &str) -> String {
    let level = log_level.trim();
    if level.is_empty() {
        DEFAULT_FILTER.to_string()
    } else {
        format!("ssr_pipeline={level},tower_http={level}")
    }
}

/// Initialize the global tracing subscriber.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_for(log_level)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

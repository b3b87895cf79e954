//! `ssr-server`: serve an application through the rendering pipeline.
//!
//! ```text
//!   ssr.toml ─▶ config ─▶ lifecycle::startup ─▶ Pipeline ─▶ SsrServer
//!                                                  │
//!                 static ─▶ redirect* ─▶ render ─▶ catch
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use ssr_pipeline::config::{load_config, validate_config, ConfigWatcher, Mode, SsrConfig};
use ssr_pipeline::lifecycle::{build_pipeline, Shutdown};
use ssr_pipeline::observability::{logging, metrics};
use ssr_pipeline::{AppShell, SsrServer};

#[derive(Debug, Parser)]
#[command(name = "ssr-server", version, about = "Server side rendering pipeline")]
struct Cli {
    /// Configuration file.
    #[arg(long, short, default_value = "ssr.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `app.base`.
    #[arg(long)]
    base: Option<String>,

    /// Override `app.mode`.
    #[arg(long, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Watch the config file and report changes.
    #[arg(long)]
    watch_config: bool,
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    match value {
        "development" => Ok(Mode::Development),
        "production" => Ok(Mode::Production),
        other => Err(format!("unknown mode '{}', expected development or production", other)),
    }
}

fn apply_overrides(cli: &Cli, mut config: SsrConfig) -> SsrConfig {
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(base) = &cli.base {
        config.app.base = base.clone();
    }
    if let Some(mode) = cli.mode {
        config.app.mode = mode;
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = apply_overrides(&cli, load_config(&cli.config)?);
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("invalid configuration: {}", error);
        }
        return Err("invalid configuration after command line overrides".into());
    }

    logging::init(&config.observability.log_level);
    tracing::info!("ssr-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base = %config.app.base,
        mode = %config.app.mode,
        template = %config.app.template_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let startup = build_pipeline(&config, Arc::new(AppShell), None)?;

    // Watchers stop when dropped; hold them until the server exits.
    let _template_watcher = if config.app.watch_template || config.app.mode == Mode::Development {
        Some(startup.watch_template()?)
    } else {
        None
    };
    let _config_watcher = if cli.watch_config {
        let (watcher, mut updates) = ConfigWatcher::new(&cli.config);
        tokio::spawn(async move {
            while let Some(updated) = updates.recv().await {
                tracing::warn!(
                    base = %updated.app.base,
                    redirects = updated.redirects.len(),
                    "Configuration changed on disk, restart to apply it"
                );
            }
        });
        Some(watcher.run()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = SsrServer::new(startup.pipeline, config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

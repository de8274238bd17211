//! Rewriting Web Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  REWRITE PROXY                   │
//!   GET /proxy?url=...   │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ─────────────────────┼─▶│  http   │──▶│ rewrite  │──▶│   upstream   │───┼──▶ Target
//!                        │  │ server  │   │ validate │   │   fetcher    │   │
//!                        │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                        │                                      │           │
//!                        │                                      ▼           │
//!   Client Response      │  ┌─────────┐   ┌──────────────────────────────┐  │
//!   ◀────────────────────┼──│security │◀──│ dispatch: html rewrite | raw │  │
//!                        │  │ headers │   │          stream              │  │
//!                        │  └─────────┘   └──────────────────────────────┘  │
//!                        │                                                  │
//!                        │   config · observability · lifecycle             │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rewrite_proxy::config::validation::validate_config;
use rewrite_proxy::config::{apply_env_overrides, load_config, ConfigError, ProxyConfig};
use rewrite_proxy::lifecycle::{spawn_signal_listener, Shutdown};
use rewrite_proxy::observability::{logging::init_logging, metrics::init_metrics};
use rewrite_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "rewrite-proxy")]
#[command(about = "Fetch web pages and re-serve them with links routed through the proxy", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:3000).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config);
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability);
    tracing::info!("rewrite-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix = %config.proxy.prefix,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

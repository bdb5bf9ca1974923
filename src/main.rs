//! Security gateway for a multi-tenant build and deploy API.
//!
//! Fronts the build API and enforces, in order: size ceilings, header
//! hygiene, authentication, authorization and namespace isolation, rate
//! and admission limits, structural guards, injection defense, and
//! outbound secret redaction.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use build_gateway::config::{loader, watcher};
use build_gateway::observability::{logging, metrics};
use build_gateway::{GatewayConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "build-gateway", about = "Request-path security gateway")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => GatewayConfig::default(),
    };
    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        max_connections = config.listener.max_connections,
        rate_limit = config.rate_limit.limit,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::from_config(config);

    // Hot reload when a config file is in play.
    let mut watcher_guard = None;
    if let Some(path) = &args.config {
        match watcher::watch(path) {
            Ok((guard, updates)) => {
                server.spawn_reload(updates);
                watcher_guard = Some(guard);
            }
            Err(e) => tracing::error!(error = %e, "Failed to start config watcher"),
        }
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    server.run(listener, shutdown.subscribe()).await?;
    drop(watcher_guard);
    Ok(())
}

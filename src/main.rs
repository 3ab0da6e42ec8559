//! request-gate binary: load config, wire the stores, serve.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use request_gate::config::{load_config, GateConfig};
use request_gate::http::server::GateServer;
use request_gate::identity::store::InMemoryStore;
use request_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "request-gate", version, about = "Request-gating pipeline fronting an HTTP API")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        requests_per_second = config.rate_limit.requests_per_second,
        burst = config.rate_limit.burst,
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

    // The binary runs against in-memory stores; a deployment plugs its
    // persistence layer in through the same traits.
    let store = Arc::new(InMemoryStore::new());
    let server = GateServer::new(config, store.clone(), store);

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

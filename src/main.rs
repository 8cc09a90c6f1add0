//! AI for Science API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TCP listener ──▶ request id / trace / CORS
//!                                          │
//!                                          ▼
//!                                ┌───────────────────┐
//!                                │ NormalizeError    │  500 {"error": "internal_error"}
//!                                │  ┌─────────────┐  │
//!                                │  │ Timeout     │  │  504 {"error": "timeout"}
//!                                │  │  ┌───────┐  │  │
//!                                │  │  │routes │──┼──┼──▶ cache liveness check (Redis)
//!                                │  │  └───────┘  │  │
//!                                │  └─────────────┘  │
//!                                └───────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use science_api::config::load_effective_config;
use science_api::lifecycle::{signals, Shutdown};
use science_api::observability::{logging, metrics};
use science_api::ApiServer;

#[derive(Parser)]
#[command(name = "science-api", version, about = "AI for Science API server")]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "SCIENCE_API_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let lookup = |key: &str| match key {
        "BIND_ADDRESS" => args.bind.clone().or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    };

    let config = match load_effective_config(args.config.as_deref(), lookup) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        api_name = %config.api_name,
        version = env!("CARGO_PKG_VERSION"),
        env = %config.env,
        bind_address = %config.listener.bind_address,
        root_path = %config.root_path,
        request_timeout_ms = config.timeouts.request_ms,
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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = ApiServer::new(config)?;
    server.run(listener, shutdown.listener()).await?;

    if let Some(reason) = shutdown.reason() {
        tracing::info!(%reason, "Shutdown complete");
    }
    Ok(())
}

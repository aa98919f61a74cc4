//! Venting jar service.
//!
//! A persisted counter with a five-entry history, served over JSON HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 VENTING JAR                   │
//!                        │                                               │
//!   GET/POST /api/jar    │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!   ─────────────────────┼─▶│  http   │───▶│   jar    │───▶│  store   │──┼──▶ Redis
//!                        │  │ server  │    │ accessor │    │ KvStore  │  │
//!   JSON response        │  └─────────┘    └──────────┘    └────┬─────┘  │
//!   ◀────────────────────┼──                                    │        │
//!                        │                              ┌───────▼──────┐ │
//!                        │                              │  connection  │ │
//!                        │                              │ + reconnect  │ │
//!                        │                              └──────────────┘ │
//!                        │  config · observability · lifecycle           │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use venting_jar::config::load_config;
use venting_jar::lifecycle::{signals, Application, Shutdown};
use venting_jar::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "venting-jar")]
#[command(about = "Serve the venting jar API", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "JAR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(config.observability.log_format);

    tracing::info!("venting-jar v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_backend = ?config.store.backend,
        namespace = %config.store.namespace,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let app = Application::build(config).await?;
    let listener = app.bind().await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    app.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

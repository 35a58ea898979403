//! Student records API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     alunos-api                       │
//!                    │                                                      │
//!   Client Request   │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!   ─────────────────┼─▶│  http   │───▶│  routes  │───▶│  controller  │     │
//!                    │  │ server  │    │ (method, │    │ + validator  │     │
//!                    │  └─────────┘    │   id)    │    └──────┬───────┘     │
//!                    │                 └──────────┘           │             │
//!                    │                                        ▼             │
//!   Client Response  │  ┌──────────┐                   ┌──────────────┐     │
//!   ◀────────────────┼──│ envelope │◀──────────────────│    store     │◀────┼── PostgREST
//!                    │  │  (JSON)  │                   │   adapter    │     │   table
//!                    │  └──────────┘                   └──────────────┘     │
//!                    │                                                      │
//!                    │  Cross-cutting: config, logging, metrics, shutdown   │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use alunos_api::config::{self, AppConfig};
use alunos_api::lifecycle::{signals, Shutdown};
use alunos_api::observability::{logging, metrics};
use alunos_api::HttpServer;

#[derive(Parser)]
#[command(name = "alunos-api")]
#[command(about = "HTTP API for student records", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Without it, defaults and the
    /// SUPABASE_URL / SUPABASE_ANON_KEY environment variables are used.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config: AppConfig = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("alunos-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_backend = ?config.store.backend,
        require_bearer = config.auth.require_bearer,
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
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Cancellable request server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ axum router ──▶ request context (root → deadline → caller timeout)
//!                                          │
//!                                          ▼
//!                            /hello: race(work timer, context fired)
//!                            /headers: echo
//!                            /view /edit /save: page store + templates
//!                                          │
//!     Client Response                      ▼
//!     ◀─────────────── 200 "hello\n" | 500 "context canceled" / "context deadline exceeded"
//!
//!     SIGINT/SIGTERM ──▶ Shutdown ──▶ root context cancelled ──▶ drain
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use context_server::config::{load_config, ServerConfig};
use context_server::http::HttpServer;
use context_server::lifecycle::{wait_for_signal, Shutdown};
use context_server::observability::{logging, metrics};
use context_server::pages::FilePageStore;

#[derive(Parser)]
#[command(name = "context-server")]
#[command(about = "HTTP server whose handlers race simulated work against request cancellation", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!("context-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        hello_work_ms = config.hello.work_ms,
        pages_enabled = config.pages.enabled,
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

    let store = Arc::new(FilePageStore::new(config.pages.data_dir.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Signal received");
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

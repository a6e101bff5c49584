//! `pion` server binary.
//!
//! Loads configuration, registers the sample controllers and closures,
//! and serves until SIGINT or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use pion::config::{load_config, PionConfig};
use pion::lifecycle::{signals, Shutdown};
use pion::observability::{logging, metrics};
use pion::{demo, HttpServer, Pion};

#[derive(Parser)]
#[command(name = "pion")]
#[command(about = "Serve a Pion application", long_about = None)]
struct Cli {
    /// Configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PionConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("pion v{} starting", env!("CARGO_PKG_VERSION"));

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

    let mut app = Pion::from_config(&config, demo::controllers());
    demo::routes(&mut app);
    if app.routes().not_found().is_none() {
        app.set_not_found_action("Error404");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = app.routes().len(),
        base_uri = %app.base_uri(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(Arc::new(app), &config);

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_termination(&signal_shutdown).await;
    });

    server.run(listener, shutdown).await?;
    Ok(())
}

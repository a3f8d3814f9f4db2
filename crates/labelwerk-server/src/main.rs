// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: serial-number label print service.
//
// Entry point. Initialises logging, loads configuration, and serves the HTTP
// surface until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use labelwerk_core::config::AppConfig;
use labelwerk_core::error::Result;
use labelwerk_server::{AppStateInner, app_with_state};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Render serial-number labels and send them to network or USB label printers
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "LABELWERK_CONFIG")]
    config: Option<PathBuf>,
    /// Address to bind to (overrides the configuration file)
    #[arg(short, long, env = "LABELWERK_ADDRESS")]
    address: Option<IpAddr>,
    /// Port to bind to (overrides the configuration file)
    #[arg(short, long, env = "LABELWERK_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(address) = cli.address {
        config.bind_address = address;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }

    let state = AppStateInner::from_config(&config)?;
    let addr = SocketAddr::new(config.bind_address, config.server_port);
    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        accepting = config.accept_jobs_on_start,
        usb = config.usb.enabled,
        "Labelwerk listening"
    );

    axum::serve(listener, app_with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Labelwerk stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

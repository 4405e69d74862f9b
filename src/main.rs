//! # RP Server
//!
//! Collaborative role-play chat server.
//!
//! This is the application entry point that:
//! - Initializes tracing
//! - Loads configuration (INI path from the first argument)
//! - Starts the server and waits until it is ready
//! - Stops it on Ctrl-C or on a fatal component error

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};

use rp_server::config::Settings;
use rp_server::startup::Server;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing subscriber for structured logging
    rp_server::telemetry::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{:#}", e), "Server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref()).context("loading configuration")?;
    info!(
        data_dir = %settings.data_dir.display(),
        port = settings.port,
        admin_port = settings.admin_port,
        ssl = settings.ssl,
        "Configuration loaded"
    );

    let server = Server::start(settings).await.context("starting server")?;
    info!(
        client = %server.client_addr(),
        admin = %server.admin_addr(),
        "Server ready to accept connections"
    );

    let fatal = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown requested"),
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
            }
            None
        }
        reason = server.fatal() => Some(reason),
    };

    server.stop().await.context("stopping server")?;

    match fatal {
        Some(reason) => Err(anyhow::anyhow!("fatal error: {}", reason)),
        None => Ok(()),
    }
}

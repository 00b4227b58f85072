//! Telemetry simulator server
//!
//! Serves generated mesh telemetry, dashboard snapshots and Prometheus
//! metrics over HTTP.

use anyhow::{Context, Result};
use sim_lib::{StructuredLogger, TelemetryEngine};
use sim_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting telemetry-sim-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        port = config.api_port,
        ranges = config.engine.ranges.len(),
        "Server configured"
    );

    let engine =
        TelemetryEngine::new(config.engine.clone()).context("Failed to build telemetry engine")?;

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVER_VERSION, config.api_port, config.seed.is_some());

    let state = Arc::new(api::AppState::new(engine, logger.clone(), config.seed));
    let api_handle = tokio::spawn(api::serve(config.api_port, state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server exited"),
                Ok(Err(e)) => {
                    error!(error = %e, "API server failed");
                    logger.log_shutdown("API server failed");
                    return Err(e);
                }
                Err(e) => {
                    error!(error = %e, "API server task panicked");
                    logger.log_shutdown("API server task panicked");
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}

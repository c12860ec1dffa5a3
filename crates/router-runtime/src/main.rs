//! `router-runtime` binary.

use anyhow::{Context, Result};
use router_runtime::{RouterConfig, RouterRuntime};
use router_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RouterConfig::load().context("Failed to load router configuration")?;

    let mut telemetry = TelemetryConfig::from_env();
    if !config.log_level.is_empty() {
        telemetry.log_level = config.log_level.clone();
    }
    let _telemetry = init_telemetry(telemetry)
        .await
        .context("Failed to initialize telemetry")?;

    let runtime = RouterRuntime::new(config);
    runtime.start();

    info!("Router is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}

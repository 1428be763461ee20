//! # Rollup Prover
//!
//! Entry point for the prover process.
//!
//! ## Startup Sequence
//!
//! 1. Initialise telemetry (logs, metrics)
//! 2. Load `RuntimeConfig` from the environment; missing identifiers abort
//! 3. Wire subsystems and spawn their loops
//! 4. Run until Ctrl-C, then shut down gracefully

use anyhow::{Context, Result};
use tracing::info;

use prover_runtime::{ProverRuntime, RuntimeConfig};
use prover_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = RuntimeConfig::from_env().context("invalid prover configuration")?;

    let runtime = ProverRuntime::new(config)?;
    runtime.start();

    info!("Prover is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    let snapshot = telemetry.metrics_snapshot()?;
    info!(bytes = snapshot.len(), "Final metrics snapshot rendered");
    Ok(())
}

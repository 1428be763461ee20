//! # Prover Telemetry
//!
//! Observability for the rollup prover.
//!
//! ## Components
//!
//! - **Logs**: `tracing` with an `EnvFilter`, JSON or pretty output
//! - **Metrics**: Prometheus collectors, rendered with [`encode_metrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prover_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RP_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `RP_JSON_LOGS` | `false` | JSON log output |
//! | `RP_INSTANCE_ID` | `0` | Instance identifier in the service name |
//! | `RP_NETWORK` | `devnet` | Network label |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, CURRENT_BLOCK, EVENT_BUS_EVENTS,
    LAST_SETTLED_BLOCK, LOOP_PASSES, REGISTRY, SUBSYSTEM_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Collectors could not be registered or encoded
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    logging::init_logging(&config)?;

    Ok(TelemetryGuard { metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Render all metrics in Prometheus text format.
    pub fn metrics_snapshot(&self) -> Result<String, TelemetryError> {
        self.metrics.encode()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

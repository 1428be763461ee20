//! Prometheus metrics for the prover process.
//!
//! All metrics follow the naming convention: `rp_<area>_<metric>_<unit>`.
//! Subsystem crates register their own collectors in the default registry
//! behind their `metrics` feature; `encode_metrics` renders both.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Process metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT BUS METRICS
    // =========================================================================

    /// Events observed on the bus
    pub static ref EVENT_BUS_EVENTS: CounterVec = CounterVec::new(
        Opts::new("rp_eventbus_events_total", "Events observed on the event bus"),
        &["event", "source_subsystem"]
    ).expect("metric creation failed");

    // =========================================================================
    // CHAIN PROGRESS
    // =========================================================================

    /// Highest block opened by the ledger
    pub static ref CURRENT_BLOCK: Gauge = Gauge::new(
        "rp_chain_current_block",
        "Highest block number opened upstream"
    ).expect("metric creation failed");

    /// Highest block settled in order
    pub static ref LAST_SETTLED_BLOCK: Gauge = Gauge::new(
        "rp_chain_last_settled_block",
        "Highest block number settled in order from genesis"
    ).expect("metric creation failed");

    // =========================================================================
    // LOOP METRICS
    // =========================================================================

    /// Runtime loop passes by loop name
    pub static ref LOOP_PASSES: CounterVec = CounterVec::new(
        Opts::new("rp_runtime_loop_passes_total", "Runtime loop passes by loop"),
        &["loop"]
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Subsystem errors by type
    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("rp_subsystem_errors_total", "Errors by subsystem and type"),
        &["subsystem", "error_type"]
    ).expect("metric creation failed");
}

/// Handle proving the process collectors were registered.
pub struct MetricsHandle {
    _private: (),
}

impl MetricsHandle {
    /// Render all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_metrics()
    }
}

/// Register all process metrics with `REGISTRY`.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENT_BUS_EVENTS.clone()),
        Box::new(CURRENT_BLOCK.clone()),
        Box::new(LAST_SETTLED_BLOCK.clone()),
        Box::new(LOOP_PASSES.clone()),
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle { _private: () })
}

/// Encode process and subsystem metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut metric_families = REGISTRY.gather();
    metric_families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

//! # Settlement Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `rp_settlement_blocks_total` - blocks settled by this instance
//! - `rp_settlement_failures_total` - settlement attempts that errored, by reason
//! - `rp_settlement_last_block` - highest block settled by this instance

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_int_counter, register_int_gauge, CounterVec, IntCounter,
    IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Blocks settled
    pub static ref BLOCKS_SETTLED: IntCounter = register_int_counter!(
        "rp_settlement_blocks_total",
        "Blocks settled by this instance"
    )
    .expect("Failed to create BLOCKS_SETTLED metric");

    /// Failures by reason
    pub static ref SETTLEMENT_FAILURES: CounterVec = register_counter_vec!(
        "rp_settlement_failures_total",
        "Settlement attempts that errored",
        &["reason"]
    )
    .expect("Failed to create SETTLEMENT_FAILURES metric");

    /// Highest settled block
    pub static ref LAST_BLOCK: IntGauge = register_int_gauge!(
        "rp_settlement_last_block",
        "Highest block settled by this instance"
    )
    .expect("Failed to create LAST_BLOCK metric");
}

/// Record a settled block
#[cfg(feature = "metrics")]
pub fn record_settled(block_number: u64) {
    BLOCKS_SETTLED.inc();
    LAST_BLOCK.set(block_number as i64);
}

/// Record a failed attempt
#[cfg(feature = "metrics")]
pub fn record_failure(reason: &str) {
    SETTLEMENT_FAILURES.with_label_values(&[reason]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_settled(_block_number: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_failure(_reason: &str) {}

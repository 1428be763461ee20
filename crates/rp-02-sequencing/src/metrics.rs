//! # Sequencing Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `rp_sequencing_operations_applied_total` - operations applied to the ledger
//! - `rp_sequencing_operations_failed_total` - operations rejected by a ledger rule (by rule)
//! - `rp_sequencing_proofs_submitted_total` - singleton proofs by registry outcome
//! - `rp_sequencing_proofs_repaired_total` - singleton proofs regenerated for rejected coverage
//! - `rp_sequencing_next_sequence` - next sequence the feed expects

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Operations applied
    pub static ref OPERATIONS_APPLIED: IntCounter = register_int_counter!(
        "rp_sequencing_operations_applied_total",
        "Operations applied to the account ledger"
    )
    .expect("Failed to create OPERATIONS_APPLIED metric");

    /// Operations rejected by a ledger rule
    pub static ref OPERATIONS_FAILED: CounterVec = register_counter_vec!(
        "rp_sequencing_operations_failed_total",
        "Operations rejected by a ledger rule",
        &["rule"]
    )
    .expect("Failed to create OPERATIONS_FAILED metric");

    /// Singleton submissions by outcome
    pub static ref PROOFS_SUBMITTED: CounterVec = register_counter_vec!(
        "rp_sequencing_proofs_submitted_total",
        "Singleton proofs submitted to the registry",
        &["outcome"]
    )
    .expect("Failed to create PROOFS_SUBMITTED metric");

    /// Singleton proofs regenerated by repair
    pub static ref PROOFS_REPAIRED: IntCounter = register_int_counter!(
        "rp_sequencing_proofs_repaired_total",
        "Singleton proofs regenerated for rejected coverage"
    )
    .expect("Failed to create PROOFS_REPAIRED metric");

    /// Next expected sequence
    pub static ref NEXT_SEQUENCE: Gauge = register_gauge!(
        "rp_sequencing_next_sequence",
        "Next sequence number the feed expects"
    )
    .expect("Failed to create NEXT_SEQUENCE metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record an applied operation
#[cfg(feature = "metrics")]
pub fn record_operation_applied(next_sequence: u64) {
    OPERATIONS_APPLIED.inc();
    NEXT_SEQUENCE.set(next_sequence as f64);
}

/// Record an operation rejected by `rule`
#[cfg(feature = "metrics")]
pub fn record_operation_failed(rule: &str) {
    OPERATIONS_FAILED.with_label_values(&[rule]).inc();
}

/// Record a singleton submission outcome
#[cfg(feature = "metrics")]
pub fn record_proof_submitted(outcome: &str) {
    PROOFS_SUBMITTED.with_label_values(&[outcome]).inc();
}

/// Record repaired coverage
#[cfg(feature = "metrics")]
pub fn record_proofs_repaired(count: u64) {
    PROOFS_REPAIRED.inc_by(count);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_operation_applied(_next_sequence: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_operation_failed(_rule: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_proof_submitted(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_proofs_repaired(_count: u64) {}

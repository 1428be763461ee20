//! # Proof Merge Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `rp_merge_attempts_total` - merge attempts by outcome
//! - `rp_merge_errors_total` - failed attempts by error kind
//! - `rp_merge_rejections_total` - records flagged REJECTED
//! - `rp_merge_active_jobs` - attempts currently in flight
//! - `rp_merge_attempt_duration_seconds` - wall time of finished attempts
//! - `rp_merge_passes_total` - coordinator passes

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_int_counter, CounterVec,
    Gauge, Histogram, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Attempts by outcome
    pub static ref MERGE_ATTEMPTS: CounterVec = register_counter_vec!(
        "rp_merge_attempts_total",
        "Merge attempts by outcome",
        &["outcome"]
    )
    .expect("Failed to create MERGE_ATTEMPTS metric");

    /// Failed attempts by error kind
    pub static ref MERGE_ERRORS: CounterVec = register_counter_vec!(
        "rp_merge_errors_total",
        "Failed merge attempts by error kind",
        &["kind"]
    )
    .expect("Failed to create MERGE_ERRORS metric");

    /// Records flagged REJECTED
    pub static ref REJECTIONS: IntCounter = register_int_counter!(
        "rp_merge_rejections_total",
        "Proof records flagged REJECTED after data loss"
    )
    .expect("Failed to create REJECTIONS metric");

    /// In-flight attempts
    pub static ref ACTIVE_JOBS: Gauge = register_gauge!(
        "rp_merge_active_jobs",
        "Merge attempts currently in flight"
    )
    .expect("Failed to create ACTIVE_JOBS metric");

    /// Attempt duration
    pub static ref ATTEMPT_DURATION: Histogram = register_histogram!(
        "rp_merge_attempt_duration_seconds",
        "Wall time of finished merge attempts",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]
    )
    .expect("Failed to create ATTEMPT_DURATION metric");

    /// Coordinator passes
    pub static ref PASSES: IntCounter = register_int_counter!(
        "rp_merge_passes_total",
        "Coordinator passes completed"
    )
    .expect("Failed to create PASSES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a finished attempt
#[cfg(feature = "metrics")]
pub fn record_attempt(outcome: &str, seconds: f64) {
    MERGE_ATTEMPTS.with_label_values(&[outcome]).inc();
    ATTEMPT_DURATION.observe(seconds);
}

/// Record a failed attempt
#[cfg(feature = "metrics")]
pub fn record_error(kind: &str) {
    MERGE_ERRORS.with_label_values(&[kind]).inc();
}

/// Record a rejection
#[cfg(feature = "metrics")]
pub fn record_rejection() {
    REJECTIONS.inc();
}

/// Update in-flight attempts
#[cfg(feature = "metrics")]
pub fn set_active_jobs(count: usize) {
    ACTIVE_JOBS.set(count as f64);
}

/// Record a coordinator pass
#[cfg(feature = "metrics")]
pub fn record_pass() {
    PASSES.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_attempt(_outcome: &str, _seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_error(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejection() {}

#[cfg(not(feature = "metrics"))]
pub fn set_active_jobs(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_pass() {}

//! # rp-03-proof-merge
//!
//! Folds a block's singleton proofs, pair by pair, into one proof covering
//! the whole block.
//!
//! ## Overview
//!
//! - **Selector** (`domain::selector`): pure choice of the next adjacent pair
//! - **Merge Executor**: fetch, check, verify, merge, save, conditional write
//! - **Rejection Handler**: flags records whose payload is gone
//! - **Coordinator**: periodic loop over a bounded window of unsettled blocks,
//!   with per-attempt timeout and cancellation
//!
//! ## Concurrency
//!
//! ```text
//! coordinator A ─┐                       ┌─ Accepted: inputs now USED
//!                ├──→ submit_proof ──→ ──┤
//! coordinator B ─┘   (conditional)       └─ Conflict: result discarded
//! ```
//!
//! No coordinator ever locks shared state; the registry's conditional write
//! decides which of two racing merges wins.
//!
//! ## Record Lifecycle
//!
//! `CALCULATED -> USED` (merged) and `CALCULATED -> REJECTED` (data lost) are
//! the only transitions. Both end states are terminal; neither phase of the
//! selector ever picks a USED or REJECTED record.

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod ports;
pub mod rejection;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::NoSettlement;
pub use config::MergeConfig;
pub use coordinator::{Coordinator, PassReport};
pub use domain::{
    select, Clock, DedupCache, ManualClock, MergeCandidate, MergeJob, MergeJobTracker,
    SelectionHistory, SelectionPhase, TokioClock,
};
pub use error::{MergeError, MergeErrorKind, MergeResult};
pub use executor::{cancellation, CancelHandle, CancelToken, MergeExecutor, MergeOutcome};
pub use ports::outbound::{BlockSettlement, SettlementProgress};
pub use rejection::RejectionHandler;

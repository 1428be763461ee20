//! # rp-02-sequencing
//!
//! The Sequencing Feed: the single producer of singleton proofs.
//!
//! ## Overview
//!
//! - Pulls operations from an [`OperationSource`] in sequence order
//! - Applies each one to an [`AccountLedger`] (`Deposit`, `Withdraw`, `Transfer`)
//! - Proves the transition and records a `[n, n]` CALCULATED record
//! - Re-proves sequences whose coverage was rejected, until their block settles
//!
//! ```text
//! OperationSource ──→ ledger.apply ──→ prove ──→ blob save ──→ submit_proof([n, n])
//!                         │
//!                         └── violation: OperationFailed, state unchanged, no retry
//! ```
//!
//! A gap in the source stops the pass; nothing past the gap is applied.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::InMemoryOperationSource;
pub use config::SequencingConfig;
pub use domain::{Account, AccountLedger, LedgerViolation};
pub use error::{SequencingError, SequencingResult};
pub use ports::outbound::OperationSource;
pub use service::{FailedOperation, FeedReport, SequencingFeed};

//! # rp-04-settlement
//!
//! The Settlement Submitter: publishes full block proofs to the settlement
//! chain, strictly in block order.
//!
//! A block settles only when all of these hold:
//!
//! - it is closed and a single CALCULATED record spans it
//! - its predecessor is settled
//! - its start root equals the predecessor's end root
//! - the full proof verifies and matches the block header
//!
//! ```text
//! get_block ─→ predecessor settled? ─→ continuity ─→ verify ─→ already on chain?
//!                                                                 │        │
//!                                                        mark_settled   submit ─→ mark_settled(tx)
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{MockSettlementChain, SettledEntry};
pub use config::SettlementConfig;
pub use domain::{settlement_memo, NotReady, SettlementOutcome};
pub use error::{SettlementError, SettlementResult};
pub use ports::outbound::{SettlementChain, SettlementRequest};
pub use service::SettlementSubmitter;

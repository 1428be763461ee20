//! # rp-01-proof-registry
//!
//! Durable proof accounting for the rollup prover.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Status Registry**: per-block table of proof records with atomic,
//!   conditional writes (`submit_proof` answers `Accepted` or `Conflict`)
//! - **Blob Store**: write-once, content-addressed storage for proof payloads
//!
//! ## Record Lifecycle
//!
//! ```text
//! (none) ──submit──→ CALCULATED ──merge──→ USED      (terminal)
//!                         │
//!                         └────reject──→ REJECTED    (terminal)
//! ```
//!
//! A submission is accepted only if its merge inputs are still CALCULATED and
//! no other CALCULATED record overlaps the new range, so two CALCULATED
//! records never overlap.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rp_01_proof_registry::{InMemoryStatusRegistry, ProofSubmission, StatusRegistry};
//!
//! let registry = InMemoryStatusRegistry::new(genesis_root);
//! registry.open_block(1, 1, genesis_root)?;
//! registry.submit_proof(ProofSubmission::fresh(1, SequenceRange::single(1), handle)).await?;
//! ```

pub mod adapters;
pub mod error;
pub mod ports;

pub use adapters::{InMemoryBlobStore, InMemoryStatusRegistry};
pub use error::{RegistryError, RegistryResult};
pub use ports::outbound::{
    BlobStore, ProofSubmission, RejectOutcome, StatusRegistry, SubmitOutcome,
};

//! # Shared Types Crate
//!
//! Domain entities shared by every prover subsystem: sequence ranges, proof
//! records, per-block proof tables, block headers, proof payloads and ledger
//! operations.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Ranges**: A record's range never changes after creation;
//!   only its status moves, and only forward.
//! - **Opaque Payloads**: Proof bytes travel through the blob store as
//!   bincode-encoded `StateProof` values.

pub mod entities;
pub mod errors;
pub mod operations;
pub mod proof;

pub use entities::*;
pub use errors::*;
pub use operations::*;
pub use proof::*;

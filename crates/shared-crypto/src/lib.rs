//! # Shared Crypto - Proof System Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | State roots, blob handles, statement digests |
//! | `signatures` | Ed25519 | Proof attestation |
//! | `proof_system` | Ed25519 over BLAKE3 statements | Prover / Verifier / Merger capabilities |
//!
//! ## Proof System
//!
//! The capability traits (`StateTransitionProver`, `ProofVerifier`,
//! `ProofMerger`) are what the sequencing, merge and settlement subsystems
//! depend on. `AttestedProofSystem` implements all three deterministically:
//! a proof is an Ed25519 signature over the statement
//! `(block, range, start_root, end_root)`, and the verification key is the
//! signer's public key.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod proof_system;
pub mod signatures;

// Re-exports
pub use errors::{CryptoError, CryptoResult};
pub use hashing::{blake3_hash, blake3_hash_many, blake3_hex, Blake3Hasher};
pub use proof_system::{
    statement_digest, AttestedProofSystem, ProofMerger, ProofVerifier, StateTransition,
    StateTransitionProver, VerificationKey,
};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}

//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// A proof did not verify against the system's key
    #[error("Invalid proof for block {block_number} range {range}")]
    InvalidProof {
        /// Block of the rejected proof
        block_number: u64,
        /// Range of the rejected proof, formatted
        range: String,
    },

    /// Merge inputs are not consecutive states of the same block
    #[error("State mismatch: left {left} does not chain into right {right}")]
    StateMismatch {
        /// Left range, formatted
        left: String,
        /// Right range, formatted
        right: String,
    },

    /// Proving failed
    #[error("Prover failure: {0}")]
    ProverFailure(String),
}

/// Result alias for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

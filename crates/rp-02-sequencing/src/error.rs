//! Error types for the sequencing feed

use rp_01_proof_registry::RegistryError;
use shared_crypto::CryptoError;
use shared_types::CodecError;
use thiserror::Error;

/// Sequencing feed errors
#[derive(Debug, Error)]
pub enum SequencingError {
    /// Registry or blob store call failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Prover could not produce a proof
    #[error("Prover error: {0}")]
    Prover(#[from] CryptoError),

    /// Ledger or proof encoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Operation source unreachable
    #[error("Operation source error: {reason}")]
    Source { reason: String },
}

impl SequencingError {
    /// Whether the next pass may succeed without intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            SequencingError::Registry(e) => e.is_transient(),
            SequencingError::Source { .. } => true,
            _ => false,
        }
    }
}

/// Result type for sequencing operations
pub type SequencingResult<T> = Result<T, SequencingError>;

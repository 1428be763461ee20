//! Error types for the settlement submitter

use rp_01_proof_registry::RegistryError;
use shared_types::CodecError;
use thiserror::Error;

/// Settlement errors
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Registry or blob store call failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Settlement chain unreachable
    #[error("Settlement chain unavailable: {reason}")]
    ChainUnavailable { reason: String },

    /// Settlement chain refused the submission
    #[error("Settlement of block {block_number} refused: {reason}")]
    Refused { block_number: u64, reason: String },

    /// Block does not start where its predecessor ended
    #[error(
        "Block {block_number} starts at {found} but block {} ended at {expected}",
        block_number - 1
    )]
    ContinuityViolation {
        block_number: u64,
        expected: String,
        found: String,
    },

    /// Final proof failed verification
    #[error("Final proof of block {block_number} is invalid: {reason}")]
    InvalidProof { block_number: u64, reason: String },

    /// Final proof does not match the block header
    #[error("Final proof of block {block_number} does not match its header: {reason}")]
    HeaderMismatch { block_number: u64, reason: String },

    /// Payload decoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl SettlementError {
    /// Whether the next pass may succeed without intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            SettlementError::Registry(e) => e.is_transient(),
            SettlementError::ChainUnavailable { .. } => true,
            _ => false,
        }
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            SettlementError::Registry(_) => "registry",
            SettlementError::ChainUnavailable { .. } => "chain_unavailable",
            SettlementError::Refused { .. } => "refused",
            SettlementError::ContinuityViolation { .. } => "continuity",
            SettlementError::InvalidProof { .. } => "invalid_proof",
            SettlementError::HeaderMismatch { .. } => "header_mismatch",
            SettlementError::Codec(_) => "codec",
        }
    }
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;

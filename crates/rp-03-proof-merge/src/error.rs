//! Error types for the proof merge subsystem

use rp_01_proof_registry::RegistryError;
use shared_types::{CodecError, SequenceRange};
use std::time::Duration;
use thiserror::Error;

/// Coarse classification used for logging, metrics and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeErrorKind {
    TransientIo,
    InvalidProof,
    Timeout,
    Registry,
    Settlement,
}

impl MergeErrorKind {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeErrorKind::TransientIo => "transient_io",
            MergeErrorKind::InvalidProof => "invalid_proof",
            MergeErrorKind::Timeout => "timeout",
            MergeErrorKind::Registry => "registry",
            MergeErrorKind::Settlement => "settlement",
        }
    }
}

/// Proof merge errors
#[derive(Debug, Error)]
pub enum MergeError {
    /// Network or storage failure; retried on the next pass
    #[error("Transient I/O failure: {reason}")]
    TransientIo { reason: String },

    /// Payload mismatch or failed verification; fatal to the attempt only
    #[error("Invalid proof {range} in block {block_number}: {reason}")]
    InvalidProof {
        block_number: u64,
        range: SequenceRange,
        reason: String,
    },

    /// Attempt exceeded its time budget and was abandoned
    #[error("Merge of {left} + {right} in block {block_number} timed out after {after:?}")]
    Timeout {
        block_number: u64,
        left: SequenceRange,
        right: SequenceRange,
        after: Duration,
    },

    /// Registry refused a malformed request
    #[error("Registry error: {0}")]
    Registry(RegistryError),

    /// Settlement step failed for a block
    #[error("Settlement of block {block_number} failed: {reason}")]
    Settlement { block_number: u64, reason: String },

    /// Encoding the merged payload failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl MergeError {
    pub fn kind(&self) -> MergeErrorKind {
        match self {
            MergeError::TransientIo { .. } => MergeErrorKind::TransientIo,
            MergeError::InvalidProof { .. } | MergeError::Codec(_) => MergeErrorKind::InvalidProof,
            MergeError::Timeout { .. } => MergeErrorKind::Timeout,
            MergeError::Registry(_) => MergeErrorKind::Registry,
            MergeError::Settlement { .. } => MergeErrorKind::Settlement,
        }
    }

    /// Whether the next pass may succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            MergeErrorKind::TransientIo | MergeErrorKind::Timeout
        )
    }
}

impl From<RegistryError> for MergeError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::Unavailable { reason } => MergeError::TransientIo { reason },
            other => MergeError::Registry(other),
        }
    }
}

/// Result type for merge operations
pub type MergeResult<T> = Result<T, MergeError>;

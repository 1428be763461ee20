//! Error types for the proof registry and blob store

use shared_types::{DataHandle, SequenceRange};
use thiserror::Error;

/// Registry and blob store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Block was never opened
    #[error("Block not found: {block_number}")]
    BlockNotFound { block_number: u64 },

    /// Block already exists
    #[error("Block already open: {block_number}")]
    BlockExists { block_number: u64 },

    /// No record exists for the range
    #[error("No record for {range} in block {block_number}")]
    RecordNotFound {
        block_number: u64,
        range: SequenceRange,
    },

    /// Range falls outside the block's sequences
    #[error("Range {range} outside block {block_number}")]
    OutOfBlockRange {
        block_number: u64,
        range: SequenceRange,
    },

    /// Submission is malformed independently of concurrent progress
    #[error("Invalid submission: {reason}")]
    InvalidSubmission { reason: String },

    /// Blob handle unknown to the store
    #[error("Blob not found: {handle}")]
    BlobNotFound { handle: DataHandle },

    /// Backend unreachable or failing
    #[error("Backend unavailable: {reason}")]
    Unavailable { reason: String },
}

impl RegistryError {
    /// Whether retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Unavailable { .. })
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

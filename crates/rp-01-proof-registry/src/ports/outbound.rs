//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The registry is the single source of truth for proof status. Every
//! conditional write it accepts is atomic; callers never lock.

use crate::error::RegistryResult;
use async_trait::async_trait;
use shared_types::{
    BlockHeader, BlockProofState, ChainStatus, DataHandle, SequenceRange, TxHandle,
};

/// A new proof record, optionally consuming the two records it was merged from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofSubmission {
    pub block_number: u64,
    pub range: SequenceRange,
    /// `(left, right)` for merges; `None` for singleton submissions.
    pub consumed: Option<(SequenceRange, SequenceRange)>,
    pub data_handle: DataHandle,
}

impl ProofSubmission {
    /// Singleton or externally produced record.
    pub fn fresh(block_number: u64, range: SequenceRange, data_handle: DataHandle) -> Self {
        Self {
            block_number,
            range,
            consumed: None,
            data_handle,
        }
    }

    /// Merge result consuming `left` and `right`.
    pub fn merged(
        block_number: u64,
        range: SequenceRange,
        left: SequenceRange,
        right: SequenceRange,
        data_handle: DataHandle,
    ) -> Self {
        Self {
            block_number,
            range,
            consumed: Some((left, right)),
            data_handle,
        }
    }
}

/// Result of an optimistic submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Record created; consumed inputs are now USED.
    Accepted,
    /// Concurrent progress made the write stale. Nothing changed.
    Conflict,
}

/// Result of a rejection request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectOutcome {
    /// Current record moved CALCULATED -> REJECTED.
    Rejected,
    /// Current record was already REJECTED.
    AlreadyRejected,
    /// Current record was consumed (USED) before the request landed.
    Consumed,
}

/// Durable per-block table of proof records.
#[async_trait]
pub trait StatusRegistry: Send + Sync {
    /// Snapshot of a block's records.
    async fn get_block(&self, block_number: u64) -> RegistryResult<BlockProofState>;

    /// Create a record, consuming merge inputs atomically.
    async fn submit_proof(&self, submission: ProofSubmission) -> RegistryResult<SubmitOutcome>;

    /// Flag the current record for `range` as REJECTED.
    async fn reject_proof(
        &self,
        block_number: u64,
        range: SequenceRange,
    ) -> RegistryResult<RejectOutcome>;

    /// Roots and settlement status of a block.
    async fn get_block_header(&self, block_number: u64) -> RegistryResult<BlockHeader>;

    /// Window bounds for the coordinator.
    async fn chain_status(&self) -> RegistryResult<ChainStatus>;

    /// Record settlement; sets `is_finished`. Idempotent.
    async fn mark_settled(&self, block_number: u64, tx: Option<TxHandle>) -> RegistryResult<()>;
}

/// Write-once storage for proof payloads.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes, returning their locator.
    async fn save(&self, bytes: Vec<u8>) -> RegistryResult<DataHandle>;

    /// Load bytes; `BlobNotFound` when the handle is unknown.
    async fn read(&self, handle: &DataHandle) -> RegistryResult<Vec<u8>>;
}

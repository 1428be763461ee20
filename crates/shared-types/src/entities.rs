//! # Core Domain Entities
//!
//! Defines the proof-accounting entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Ranges**: `SequenceRange`
//! - **Records**: `ProofStatus`, `ProofRecord`, `DataHandle`
//! - **Blocks**: `BlockProofState`, `BlockHeader`, `ChainStatus`
//! - **Settlement**: `TxHandle`

use crate::errors::RangeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte hash (BLAKE3 digests and state roots).
pub type Hash = [u8; 32];

/// A state root committing to the full account-state map.
pub type StateRoot = Hash;

// =============================================================================
// CLUSTER A: RANGES
// =============================================================================

/// An inclusive, contiguous range of sequence numbers covered by one proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceRange {
    start: u64,
    end: u64,
}

impl SequenceRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one operation.
    #[must_use]
    pub fn single(sequence: u64) -> Self {
        Self {
            start: sequence,
            end: sequence,
        }
    }

    /// First sequence in the range.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last sequence in the range.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of operations covered.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Ranges always cover at least one operation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `self` ends exactly one sequence before `next` starts.
    #[must_use]
    pub fn is_adjacent_to(&self, next: &SequenceRange) -> bool {
        self.end.checked_add(1) == Some(next.start)
    }

    /// Concatenate with the range immediately following this one.
    pub fn concat(&self, next: &SequenceRange) -> Result<Self, RangeError> {
        if !self.is_adjacent_to(next) {
            return Err(RangeError::NotAdjacent {
                left: *self,
                right: *next,
            });
        }
        Ok(Self {
            start: self.start,
            end: next.end,
        })
    }

    /// Whether the two ranges share at least one sequence.
    #[must_use]
    pub fn overlaps(&self, other: &SequenceRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `sequence` lies inside the range.
    #[must_use]
    pub fn contains(&self, sequence: u64) -> bool {
        self.start <= sequence && sequence <= self.end
    }
}

impl fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "[{}]", self.start)
        } else {
            write!(f, "[{}-{}]", self.start, self.end)
        }
    }
}

// =============================================================================
// CLUSTER B: RECORDS
// =============================================================================

/// Lifecycle status of a proof record.
///
/// `Calculated -> Used` when consumed by a merge, `Calculated -> Rejected` when
/// the backing blob is lost. Both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofStatus {
    /// Proof exists and is available as a merge input.
    Calculated,
    /// Backing data was unavailable.
    Rejected,
    /// Consumed by a merge.
    Used,
}

impl ProofStatus {
    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(&self, next: ProofStatus) -> bool {
        matches!(
            (self, next),
            (ProofStatus::Calculated, ProofStatus::Used)
                | (ProofStatus::Calculated, ProofStatus::Rejected)
        )
    }

    /// Terminal statuses never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProofStatus::Calculated)
    }
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProofStatus::Calculated => "CALCULATED",
            ProofStatus::Rejected => "REJECTED",
            ProofStatus::Used => "USED",
        };
        f.write_str(name)
    }
}

/// Opaque blob-store locator for a proof payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataHandle(pub String);

impl DataHandle {
    /// Create a handle from any string-like locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Borrow the locator string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A durable entry asserting that a proof exists for a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    /// Operations covered by the proof.
    pub range: SequenceRange,
    /// Current lifecycle status.
    pub status: ProofStatus,
    /// Where the proof payload lives.
    pub data_handle: DataHandle,
    /// Unix timestamp (ms) when the record was created.
    pub created_at: u64,
}

impl ProofRecord {
    /// New record in the `Calculated` state.
    #[must_use]
    pub fn calculated(range: SequenceRange, data_handle: DataHandle, created_at: u64) -> Self {
        Self {
            range,
            status: ProofStatus::Calculated,
            data_handle,
            created_at,
        }
    }

    /// Shorthand for `status == Calculated`.
    #[must_use]
    pub fn is_calculated(&self) -> bool {
        self.status == ProofStatus::Calculated
    }
}

// =============================================================================
// CLUSTER C: BLOCKS
// =============================================================================

/// Snapshot of the registry's proof table for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProofState {
    /// Block number.
    pub block_number: u64,
    /// First sequence in the block.
    pub start_sequence: u64,
    /// Last sequence, known once the block is closed upstream.
    pub end_sequence: Option<u64>,
    /// Set once settlement succeeded.
    pub is_finished: bool,
    /// Records in insertion order.
    pub records: Vec<ProofRecord>,
}

impl BlockProofState {
    /// Empty, open block.
    #[must_use]
    pub fn open(block_number: u64, start_sequence: u64) -> Self {
        Self {
            block_number,
            start_sequence,
            end_sequence: None,
            is_finished: false,
            records: Vec::new(),
        }
    }

    /// Range spanning the whole block, if it is closed.
    #[must_use]
    pub fn full_range(&self) -> Option<SequenceRange> {
        let end = self.end_sequence?;
        SequenceRange::new(self.start_sequence, end).ok()
    }

    /// The most recently recorded record for `range`.
    #[must_use]
    pub fn current_record(&self, range: &SequenceRange) -> Option<&ProofRecord> {
        self.records.iter().rev().find(|r| r.range == *range)
    }

    /// Whether any record for `range` has `status`.
    #[must_use]
    pub fn has_record_with_status(&self, range: &SequenceRange, status: ProofStatus) -> bool {
        self.records
            .iter()
            .any(|r| r.range == *range && r.status == status)
    }

    /// The `Calculated` record for `range`, if any.
    #[must_use]
    pub fn calculated_record(&self, range: &SequenceRange) -> Option<&ProofRecord> {
        self.records
            .iter()
            .find(|r| r.range == *range && r.is_calculated())
    }

    /// `Calculated` records in recorded order.
    pub fn calculated_records(&self) -> impl Iterator<Item = &ProofRecord> {
        self.records.iter().filter(|r| r.is_calculated())
    }

    /// Whether a `Calculated` record covers `sequence`.
    #[must_use]
    pub fn is_covered(&self, sequence: u64) -> bool {
        self.calculated_records().any(|r| r.range.contains(sequence))
    }

    /// The single `Calculated` record spanning the whole block, if present.
    #[must_use]
    pub fn final_record(&self) -> Option<&ProofRecord> {
        let full = self.full_range()?;
        self.calculated_record(&full)
    }
}

/// Roots and settlement status of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number.
    pub block_number: u64,
    /// State root before the first operation.
    pub start_root: StateRoot,
    /// State root after the last operation, once closed.
    pub end_root: Option<StateRoot>,
    /// Whether the block is settled.
    pub settled: bool,
    /// Settlement transaction, when known.
    pub settlement_tx: Option<TxHandle>,
}

impl BlockHeader {
    /// Header of block 0, settled at the genesis root.
    #[must_use]
    pub fn genesis(root: StateRoot) -> Self {
        Self {
            block_number: 0,
            start_root: root,
            end_root: Some(root),
            settled: true,
            settlement_tx: None,
        }
    }
}

/// Bounds for the coordinator's block window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainStatus {
    /// Highest block number opened so far.
    pub current_block: u64,
    /// Highest block number settled in order from genesis.
    pub last_settled_block: u64,
}

/// Settlement-chain transaction handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(pub String);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current unix time in milliseconds.
#[must_use]
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

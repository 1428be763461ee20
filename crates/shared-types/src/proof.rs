//! # Proof Payloads
//!
//! The bytes stored in the blob store for every proof record.

use crate::entities::{SequenceRange, StateRoot};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};

/// A state-transition proof for a range of operations within one block.
///
/// `proof` is opaque to everything except the proof system that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateProof {
    /// Block the operations belong to.
    pub block_number: u64,
    /// Operations covered.
    pub range: SequenceRange,
    /// State root before the first covered operation.
    pub start_root: StateRoot,
    /// State root after the last covered operation.
    pub end_root: StateRoot,
    /// Proof-system specific bytes.
    pub proof: Vec<u8>,
}

impl StateProof {
    /// Serialize for the blob store.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Deserialize a blob-store payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Whether `next` continues from this proof's final state.
    #[must_use]
    pub fn chains_into(&self, next: &StateProof) -> bool {
        self.block_number == next.block_number
            && self.range.is_adjacent_to(&next.range)
            && self.end_root == next.start_root
    }
}

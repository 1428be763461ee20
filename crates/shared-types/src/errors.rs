//! # Error Types
//!
//! Defines error types used across subsystems.

use crate::entities::SequenceRange;
use thiserror::Error;

/// Errors constructing or combining sequence ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// `start` greater than `end`.
    #[error("Inverted range: start {start} > end {end}")]
    Inverted { start: u64, end: u64 },

    /// Concatenation of ranges that do not touch.
    #[error("Ranges not adjacent: {left} then {right}")]
    NotAdjacent {
        left: SequenceRange,
        right: SequenceRange,
    },
}

/// Errors encoding or decoding a proof payload.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Payload could not be serialized.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Payload bytes were malformed.
    #[error("Decode failed: {0}")]
    Decode(String),
}

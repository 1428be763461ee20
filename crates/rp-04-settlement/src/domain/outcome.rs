//! Settlement outcomes.

use shared_types::TxHandle;
use std::fmt;

/// Why a block cannot settle yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    /// End sequence or end root not known yet
    BlockOpen,
    /// No single CALCULATED record spans the block
    MissingFullProof,
    /// The full proof's payload was lost and its record rejected
    FullProofLost,
    /// Previous block has not settled
    PredecessorUnsettled { predecessor: u64 },
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReady::BlockOpen => write!(f, "block still open"),
            NotReady::MissingFullProof => write!(f, "no full proof yet"),
            NotReady::FullProofLost => write!(f, "full proof lost"),
            NotReady::PredecessorUnsettled { predecessor } => {
                write!(f, "block {predecessor} not settled")
            }
        }
    }
}

/// Result of offering a block for settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    NotReady(NotReady),
    AlreadySettled,
    Settled(TxHandle),
}

//! # Prover Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{DataHandle, SequenceRange, TxHandle};

/// Subsystem identifiers used as event sources.
pub mod subsystem {
    /// Proof registry (rp-01).
    pub const REGISTRY: u8 = 1;
    /// Sequencing feed (rp-02).
    pub const SEQUENCING: u8 = 2;
    /// Proof merge coordinator (rp-03).
    pub const PROOF_MERGE: u8 = 3;
    /// Settlement submitter (rp-04).
    pub const SETTLEMENT: u8 = 4;
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProverEvent {
    // =========================================================================
    // SUBSYSTEM 2: SEQUENCING
    // =========================================================================
    /// A singleton proof was recorded for an operation.
    ProofSubmitted {
        /// Block of the operation.
        block_number: u64,
        /// Singleton range.
        range: SequenceRange,
        /// Blob handle of the payload.
        handle: DataHandle,
    },

    /// An operation violated a ledger rule and will not be proven.
    OperationFailed {
        /// Block of the operation.
        block_number: u64,
        /// Sequence of the operation.
        sequence: u64,
        /// Violation description.
        reason: String,
    },

    // =========================================================================
    // SUBSYSTEM 3: PROOF MERGE
    // =========================================================================
    /// Two adjacent proofs were combined and the result committed.
    ProofsMerged {
        /// Block of the proofs.
        block_number: u64,
        /// Left input.
        left: SequenceRange,
        /// Right input.
        right: SequenceRange,
        /// Blob handle of the merged payload.
        handle: DataHandle,
    },

    /// A record was flagged REJECTED because its data was unavailable.
    ProofRejected {
        /// Block of the record.
        block_number: u64,
        /// Range of the record.
        range: SequenceRange,
    },

    /// A merge attempt timed out and was abandoned.
    MergeAbandoned {
        /// Block of the pair.
        block_number: u64,
        /// Left input.
        left: SequenceRange,
        /// Right input.
        right: SequenceRange,
    },

    // =========================================================================
    // SUBSYSTEM 4: SETTLEMENT
    // =========================================================================
    /// A block's full proof was accepted by the settlement chain.
    BlockSettled {
        /// Settled block.
        block_number: u64,
        /// Settlement transaction.
        tx: TxHandle,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Error requiring operator attention (invalid proofs, broken continuity).
    CriticalError {
        /// The subsystem that encountered the error.
        subsystem_id: u8,
        /// Error description.
        error: String,
    },
}

impl ProverEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ProofSubmitted { .. } | Self::OperationFailed { .. } => EventTopic::Sequencing,
            Self::ProofsMerged { .. }
            | Self::ProofRejected { .. }
            | Self::MergeAbandoned { .. } => EventTopic::ProofMerge,
            Self::BlockSettled { .. } => EventTopic::Settlement,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::ProofSubmitted { .. } | Self::OperationFailed { .. } => subsystem::SEQUENCING,
            Self::ProofsMerged { .. }
            | Self::ProofRejected { .. }
            | Self::MergeAbandoned { .. } => subsystem::PROOF_MERGE,
            Self::BlockSettled { .. } => subsystem::SETTLEMENT,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }

    /// Short label for metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProofSubmitted { .. } => "proof_submitted",
            Self::OperationFailed { .. } => "operation_failed",
            Self::ProofsMerged { .. } => "proofs_merged",
            Self::ProofRejected { .. } => "proof_rejected",
            Self::MergeAbandoned { .. } => "merge_abandoned",
            Self::BlockSettled { .. } => "block_settled",
            Self::CriticalError { .. } => "critical_error",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Sequencing,
    ProofMerge,
    Settlement,
    /// Errors needing operator attention.
    DeadLetterQueue,
}

/// Topics a subscription wants. Empty means everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    #[must_use]
    pub fn matches(&self, event: &ProverEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}

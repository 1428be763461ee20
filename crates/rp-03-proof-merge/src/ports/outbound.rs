//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Registry, blob store and proof capabilities come from `rp-01` and
//! `shared-crypto`; settlement is the one dependency owned here.

use crate::error::MergeResult;
use async_trait::async_trait;

/// What a settlement offer achieved for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementProgress {
    /// Preconditions not met yet.
    NotReady,
    /// Already settled before this offer.
    AlreadySettled,
    /// Settled by this offer.
    Settled,
}

/// Settles blocks whose full proof is ready.
#[async_trait]
pub trait BlockSettlement: Send + Sync {
    async fn settle_if_ready(&self, block_number: u64) -> MergeResult<SettlementProgress>;
}

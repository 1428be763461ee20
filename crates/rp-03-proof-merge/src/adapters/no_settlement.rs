//! Settlement port for coordinators that only merge.

use crate::error::MergeResult;
use crate::ports::outbound::{BlockSettlement, SettlementProgress};
use async_trait::async_trait;

/// Never settles anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSettlement;

#[async_trait]
impl BlockSettlement for NoSettlement {
    async fn settle_if_ready(&self, _block_number: u64) -> MergeResult<SettlementProgress> {
        Ok(SettlementProgress::NotReady)
    }
}

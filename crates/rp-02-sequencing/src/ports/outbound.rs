//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::SequencingResult;
use async_trait::async_trait;
use shared_types::Operation;

/// Upstream source of sequenced operations.
#[async_trait]
pub trait OperationSource: Send + Sync {
    /// Up to `limit` operations with sequence `>= from_sequence`, ascending.
    async fn fetch_operations(
        &self,
        from_sequence: u64,
        limit: usize,
    ) -> SequencingResult<Vec<Operation>>;
}

//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::SettlementResult;
use async_trait::async_trait;
use shared_types::{StateProof, TxHandle};

/// A full block proof offered to the settlement chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementRequest {
    pub block_number: u64,
    pub proof: StateProof,
    pub memo: String,
}

/// External chain that accepts full block proofs.
#[async_trait]
pub trait SettlementChain: Send + Sync {
    /// Submit a proof; returns the transaction handle.
    async fn submit(&self, request: SettlementRequest) -> SettlementResult<TxHandle>;

    /// Whether the chain already holds a settlement for `block_number`.
    async fn is_included(&self, block_number: u64) -> SettlementResult<bool>;
}

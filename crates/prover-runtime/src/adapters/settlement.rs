//! Lets merge coordinators drive the settlement submitter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use rp_01_proof_registry::{BlobStore, StatusRegistry};
use rp_03_proof_merge::{BlockSettlement, MergeError, MergeResult, SettlementProgress};
use rp_04_settlement::{SettlementChain, SettlementOutcome, SettlementSubmitter};
use shared_crypto::ProofVerifier;

/// Implements the coordinator's [`BlockSettlement`] port with rp-04.
pub struct SettlementAdapter<R, B, V, C>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    C: SettlementChain,
{
    submitter: Arc<SettlementSubmitter<R, B, V, C>>,
}

impl<R, B, V, C> SettlementAdapter<R, B, V, C>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    C: SettlementChain,
{
    pub fn new(submitter: Arc<SettlementSubmitter<R, B, V, C>>) -> Self {
        Self { submitter }
    }
}

#[async_trait]
impl<R, B, V, C> BlockSettlement for SettlementAdapter<R, B, V, C>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    C: SettlementChain,
{
    async fn settle_if_ready(&self, block_number: u64) -> MergeResult<SettlementProgress> {
        match self.submitter.settle_if_ready(block_number).await {
            Ok(SettlementOutcome::Settled(_)) => Ok(SettlementProgress::Settled),
            Ok(SettlementOutcome::AlreadySettled) => Ok(SettlementProgress::AlreadySettled),
            Ok(SettlementOutcome::NotReady(reason)) => {
                debug!(block = block_number, %reason, "[rp-04] block not ready to settle");
                Ok(SettlementProgress::NotReady)
            }
            Err(e) if e.is_transient() => Err(MergeError::TransientIo {
                reason: e.to_string(),
            }),
            Err(e) => Err(MergeError::Settlement {
                block_number,
                reason: e.to_string(),
            }),
        }
    }
}

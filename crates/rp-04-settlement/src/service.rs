//! Settlement Submitter service.

use crate::config::SettlementConfig;
use crate::domain::{settlement_memo, NotReady, SettlementOutcome};
use crate::error::{SettlementError, SettlementResult};
use crate::metrics;
use crate::ports::outbound::{SettlementChain, SettlementRequest};
use rp_01_proof_registry::{BlobStore, RegistryError, StatusRegistry};
use shared_bus::{EventPublisher, ProverEvent};
use shared_crypto::{ProofVerifier, VerificationKey};
use shared_types::{BlockHeader, ProofRecord, SequenceRange, StateProof, StateRoot};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Offers full block proofs to the settlement chain in block order.
pub struct SettlementSubmitter<R, B, V, C>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    C: SettlementChain,
{
    config: SettlementConfig,
    registry: Arc<R>,
    blobs: Arc<B>,
    verifier: Arc<V>,
    chain: Arc<C>,
    verification_key: VerificationKey,
    events: Arc<dyn EventPublisher>,
}

impl<R, B, V, C> SettlementSubmitter<R, B, V, C>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    C: SettlementChain,
{
    pub fn new(
        config: SettlementConfig,
        registry: Arc<R>,
        blobs: Arc<B>,
        verifier: Arc<V>,
        chain: Arc<C>,
        verification_key: VerificationKey,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            registry,
            blobs,
            verifier,
            chain,
            verification_key,
            events,
        }
    }

    /// Settle `block_number` if every precondition holds.
    ///
    /// Safe to call repeatedly and from several instances: a block the chain
    /// already holds is marked settled without a second submission.
    pub async fn settle_if_ready(&self, block_number: u64) -> SettlementResult<SettlementOutcome> {
        let result = self.try_settle(block_number).await;
        if let Err(e) = &result {
            metrics::record_failure(e.label());
        }
        result
    }

    async fn try_settle(&self, block_number: u64) -> SettlementResult<SettlementOutcome> {
        let block = self.registry.get_block(block_number).await?;
        if block.is_finished {
            return Ok(SettlementOutcome::AlreadySettled);
        }
        let header = self.registry.get_block_header(block_number).await?;
        if header.settled {
            return Ok(SettlementOutcome::AlreadySettled);
        }

        let (Some(full), Some(end_root)) = (block.full_range(), header.end_root) else {
            return Ok(SettlementOutcome::NotReady(NotReady::BlockOpen));
        };
        let Some(record) = block.final_record().cloned() else {
            return Ok(SettlementOutcome::NotReady(NotReady::MissingFullProof));
        };

        if let Some(predecessor) = block_number.checked_sub(1) {
            let previous = self.registry.get_block_header(predecessor).await?;
            if !previous.settled {
                return Ok(SettlementOutcome::NotReady(NotReady::PredecessorUnsettled {
                    predecessor,
                }));
            }
            self.check_continuity(&previous, &header)?;
        }

        let Some(proof) = self.load_final_proof(block_number, &record).await? else {
            return Ok(SettlementOutcome::NotReady(NotReady::FullProofLost));
        };
        self.check_proof(&header, full, end_root, &proof).await?;

        if self.chain.is_included(block_number).await? {
            self.registry.mark_settled(block_number, None).await?;
            info!(
                block = block_number,
                "[rp-04] block already on settlement chain, marked settled"
            );
            return Ok(SettlementOutcome::AlreadySettled);
        }

        let memo = settlement_memo(block_number, &full, self.config.memo_max_len);
        let tx = self
            .chain
            .submit(SettlementRequest {
                block_number,
                proof,
                memo,
            })
            .await?;
        self.registry
            .mark_settled(block_number, Some(tx.clone()))
            .await?;

        info!(block = block_number, range = %full, tx = %tx, "[rp-04] block settled");
        metrics::record_settled(block_number);
        self.events
            .publish(ProverEvent::BlockSettled {
                block_number,
                tx: tx.clone(),
            })
            .await;
        Ok(SettlementOutcome::Settled(tx))
    }

    fn check_continuity(
        &self,
        previous: &BlockHeader,
        header: &BlockHeader,
    ) -> SettlementResult<()> {
        if previous.end_root == Some(header.start_root) {
            return Ok(());
        }
        Err(SettlementError::ContinuityViolation {
            block_number: header.block_number,
            expected: previous
                .end_root
                .map(hex::encode)
                .unwrap_or_else(|| "<open>".to_string()),
            found: hex::encode(header.start_root),
        })
    }

    /// `None` when the payload is gone; the record is rejected so the feed
    /// can rebuild coverage.
    async fn load_final_proof(
        &self,
        block_number: u64,
        record: &ProofRecord,
    ) -> SettlementResult<Option<StateProof>> {
        let bytes = match self.blobs.read(&record.data_handle).await {
            Ok(bytes) => bytes,
            Err(RegistryError::BlobNotFound { .. }) => {
                warn!(
                    block = block_number,
                    range = %record.range,
                    "[rp-04] full proof payload missing, rejecting record"
                );
                let outcome = self
                    .registry
                    .reject_proof(block_number, record.range)
                    .await?;
                debug!(block = block_number, ?outcome, "[rp-04] rejection result");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(StateProof::decode(&bytes)?))
    }

    async fn check_proof(
        &self,
        header: &BlockHeader,
        full: SequenceRange,
        end_root: StateRoot,
        proof: &StateProof,
    ) -> SettlementResult<()> {
        let block_number = header.block_number;
        if !self.verifier.verify(proof, &self.verification_key).await {
            return Err(SettlementError::InvalidProof {
                block_number,
                reason: "verification failed".to_string(),
            });
        }
        let reason = if proof.block_number != block_number || proof.range != full {
            Some(format!("proof covers block {} {}", proof.block_number, proof.range))
        } else if proof.start_root != header.start_root {
            Some("start root differs".to_string())
        } else if proof.end_root != end_root {
            Some("end root differs".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(SettlementError::HeaderMismatch {
                block_number,
                reason,
            }),
            None => Ok(()),
        }
    }
}

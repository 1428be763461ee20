//! Merge Executor - one attempt at combining a selected pair.
//!
//! Steps, each preceded by a cancellation check:
//!
//! 1. read both payloads (missing payload -> Rejection Handler, `Rejected`)
//! 2. decode and compare block number and range with the registry record
//! 3. verify both proofs against the verification key
//! 4. merge
//! 5. save the merged payload
//! 6. submit the merged record, consuming both inputs
//!
//! The registry write is the only commit point. A `Conflict` there means a
//! peer consumed an input first and the result is discarded.

use crate::domain::MergeCandidate;
use crate::error::{MergeError, MergeResult};
use crate::rejection::RejectionHandler;
use rp_01_proof_registry::{
    BlobStore, ProofSubmission, RegistryError, StatusRegistry, SubmitOutcome,
};
use shared_bus::{EventPublisher, ProverEvent};
use shared_crypto::{ProofMerger, ProofVerifier, VerificationKey};
use shared_types::{DataHandle, ProofRecord, SequenceRange, StateProof};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Requests cancellation of an attempt.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Observed by an attempt before every external call.
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    /// Token that is never cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Linked handle/token pair.
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelToken(rx))
}

/// Result of an attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merged record accepted by the registry
    Merged {
        range: SequenceRange,
        handle: DataHandle,
    },
    /// A peer consumed an input first; result discarded
    Conflict,
    /// An input's payload was missing and its record was rejected
    Rejected(SequenceRange),
    /// Cancellation observed; no further calls issued
    Cancelled,
}

impl MergeOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            MergeOutcome::Merged { .. } => "merged",
            MergeOutcome::Conflict => "conflict",
            MergeOutcome::Rejected(_) => "rejected",
            MergeOutcome::Cancelled => "cancelled",
        }
    }
}

enum Loaded {
    Proof(StateProof),
    Stopped(MergeOutcome),
}

pub struct MergeExecutor<R, B, V, M>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    M: ProofMerger,
{
    registry: Arc<R>,
    blobs: Arc<B>,
    verifier: Arc<V>,
    merger: Arc<M>,
    rejection: RejectionHandler<R>,
    verification_key: VerificationKey,
    events: Arc<dyn EventPublisher>,
}

impl<R, B, V, M> MergeExecutor<R, B, V, M>
where
    R: StatusRegistry,
    B: BlobStore,
    V: ProofVerifier,
    M: ProofMerger,
{
    pub fn new(
        registry: Arc<R>,
        blobs: Arc<B>,
        verifier: Arc<V>,
        merger: Arc<M>,
        verification_key: VerificationKey,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let rejection = RejectionHandler::new(registry.clone(), events.clone());
        Self {
            registry,
            blobs,
            verifier,
            merger,
            rejection,
            verification_key,
            events,
        }
    }

    /// Run one attempt for `candidate`.
    pub async fn execute(
        &self,
        candidate: &MergeCandidate,
        cancel: &CancelToken,
    ) -> MergeResult<MergeOutcome> {
        let block_number = candidate.block_number;

        let left = match self.load(block_number, &candidate.left, cancel).await? {
            Loaded::Proof(proof) => proof,
            Loaded::Stopped(outcome) => return Ok(outcome),
        };
        let right = match self.load(block_number, &candidate.right, cancel).await? {
            Loaded::Proof(proof) => proof,
            Loaded::Stopped(outcome) => return Ok(outcome),
        };

        for proof in [&left, &right] {
            if cancel.is_cancelled() {
                return Ok(MergeOutcome::Cancelled);
            }
            if !self.verifier.verify(proof, &self.verification_key).await {
                return Err(MergeError::InvalidProof {
                    block_number,
                    range: proof.range,
                    reason: "verification failed".to_string(),
                });
            }
        }

        if cancel.is_cancelled() {
            return Ok(MergeOutcome::Cancelled);
        }
        let merged = self
            .merger
            .merge(&left, &right)
            .await
            .map_err(|e| MergeError::InvalidProof {
                block_number,
                range: candidate.combined,
                reason: e.to_string(),
            })?;

        if cancel.is_cancelled() {
            return Ok(MergeOutcome::Cancelled);
        }
        let handle = self.blobs.save(merged.encode()?).await?;

        if cancel.is_cancelled() {
            return Ok(MergeOutcome::Cancelled);
        }
        let submission = ProofSubmission::merged(
            block_number,
            candidate.combined,
            left.range,
            right.range,
            handle.clone(),
        );

        match self.registry.submit_proof(submission).await? {
            SubmitOutcome::Accepted => {
                info!(
                    block = block_number,
                    left = %left.range,
                    right = %right.range,
                    "[rp-03] proofs merged"
                );
                self.events
                    .publish(ProverEvent::ProofsMerged {
                        block_number,
                        left: left.range,
                        right: right.range,
                        handle: handle.clone(),
                    })
                    .await;
                Ok(MergeOutcome::Merged {
                    range: candidate.combined,
                    handle,
                })
            }
            SubmitOutcome::Conflict => {
                debug!(
                    block = block_number,
                    range = %candidate.combined,
                    "[rp-03] merge lost to concurrent write, discarded"
                );
                Ok(MergeOutcome::Conflict)
            }
        }
    }

    async fn load(
        &self,
        block_number: u64,
        record: &ProofRecord,
        cancel: &CancelToken,
    ) -> MergeResult<Loaded> {
        if cancel.is_cancelled() {
            return Ok(Loaded::Stopped(MergeOutcome::Cancelled));
        }

        let bytes = match self.blobs.read(&record.data_handle).await {
            Ok(bytes) => bytes,
            Err(RegistryError::BlobNotFound { .. }) => {
                if cancel.is_cancelled() {
                    return Ok(Loaded::Stopped(MergeOutcome::Cancelled));
                }
                self.rejection.reject(block_number, record.range).await?;
                return Ok(Loaded::Stopped(MergeOutcome::Rejected(record.range)));
            }
            Err(other) => {
                return Err(MergeError::TransientIo {
                    reason: other.to_string(),
                })
            }
        };

        let proof = StateProof::decode(&bytes).map_err(|e| MergeError::InvalidProof {
            block_number,
            range: record.range,
            reason: e.to_string(),
        })?;

        if proof.block_number != block_number || proof.range != record.range {
            return Err(MergeError::InvalidProof {
                block_number,
                range: record.range,
                reason: format!(
                    "payload covers {} in block {}",
                    proof.range, proof.block_number
                ),
            });
        }
        Ok(Loaded::Proof(proof))
    }
}

//! Sequencing Feed - applies operations and supplies singleton proofs
//!
//! Operations are applied one at a time in sequence order; each applied
//! operation yields a singleton `[n, n]` record in the registry. The feed
//! keeps the transition of every applied operation until its block settles,
//! so coverage lost to a rejection can be re-proved from the recorded
//! pre-operation state.

use crate::config::SequencingConfig;
use crate::domain::{AccountLedger, LedgerViolation};
use crate::error::SequencingResult;
use crate::metrics;
use crate::ports::outbound::OperationSource;
use parking_lot::RwLock;
use rp_01_proof_registry::{BlobStore, ProofSubmission, StatusRegistry, SubmitOutcome};
use shared_bus::{EventPublisher, ProverEvent};
use shared_crypto::{blake3_hash, StateTransition, StateTransitionProver};
use shared_types::{BlockProofState, CodecError, Operation, StateRoot};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An operation that violated a ledger rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOperation {
    pub block_number: u64,
    pub sequence: u64,
    pub violation: LedgerViolation,
}

/// Outcome of one feed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReport {
    /// Operations applied to the ledger
    pub applied: usize,
    /// Singleton records accepted by the registry
    pub submitted: usize,
    /// Proofs skipped because coverage already existed
    pub skipped: usize,
    /// Singletons regenerated for rejected coverage
    pub repaired: usize,
    /// Operations rejected by a ledger rule
    pub failed: Vec<FailedOperation>,
    /// Sequence found where the next expected one was missing
    pub gap_at: Option<u64>,
}

enum Applied {
    Gap,
    Violation(LedgerViolation),
    Transition(StateTransition),
}

enum Singleton {
    Accepted,
    Covered,
}

struct FeedState {
    ledger: AccountLedger,
    next_sequence: u64,
    /// Applied transitions of blocks that have not settled yet.
    applied: BTreeMap<u64, StateTransition>,
}

/// One-operation-at-a-time producer of singleton proofs.
pub struct SequencingFeed<R, B, S, P>
where
    R: StatusRegistry,
    B: BlobStore,
    S: OperationSource,
    P: StateTransitionProver,
{
    config: SequencingConfig,
    state: RwLock<FeedState>,
    registry: Arc<R>,
    blobs: Arc<B>,
    source: Arc<S>,
    prover: Arc<P>,
    events: Arc<dyn EventPublisher>,
}

impl<R, B, S, P> SequencingFeed<R, B, S, P>
where
    R: StatusRegistry,
    B: BlobStore,
    S: OperationSource,
    P: StateTransitionProver,
{
    pub fn new(
        config: SequencingConfig,
        registry: Arc<R>,
        blobs: Arc<B>,
        source: Arc<S>,
        prover: Arc<P>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let next_sequence = config.first_sequence;
        Self {
            config,
            state: RwLock::new(FeedState {
                ledger: AccountLedger::new(),
                next_sequence,
                applied: BTreeMap::new(),
            }),
            registry,
            blobs,
            source,
            prover,
            events,
        }
    }

    /// Next sequence the feed will apply.
    pub fn next_sequence(&self) -> u64 {
        self.state.read().next_sequence
    }

    /// Root of the ledger after the last applied operation.
    pub fn state_root(&self) -> SequencingResult<StateRoot> {
        Ok(self.state.read().ledger.state_root()?)
    }

    /// Copy of the current ledger.
    pub fn ledger(&self) -> AccountLedger {
        self.state.read().ledger.clone()
    }

    /// Number of transitions retained for repair.
    pub fn retained_transitions(&self) -> usize {
        self.state.read().applied.len()
    }

    /// Advance over newly available operations, then repair lost coverage.
    pub async fn run_pass(&self) -> SequencingResult<FeedReport> {
        let mut report = self.advance().await?;
        report.repaired = self.repair().await?;
        Ok(report)
    }

    /// Apply the next batch of operations in order and submit their proofs.
    pub async fn advance(&self) -> SequencingResult<FeedReport> {
        let from = self.next_sequence();
        let batch = self
            .source
            .fetch_operations(from, self.config.batch_size)
            .await?;

        let mut report = FeedReport::default();
        for operation in batch {
            let transition = match self.apply_next(&operation)? {
                Applied::Gap => {
                    warn!(
                        expected = self.next_sequence(),
                        found = operation.sequence,
                        "[rp-02] sequence gap, waiting for missing operation"
                    );
                    report.gap_at = Some(operation.sequence);
                    break;
                }
                Applied::Violation(violation) => {
                    self.report_violation(&operation, violation, &mut report)
                        .await;
                    continue;
                }
                Applied::Transition(transition) => transition,
            };

            report.applied += 1;
            metrics::record_operation_applied(transition.sequence + 1);

            match self.prove_and_submit(&transition).await? {
                Singleton::Accepted => report.submitted += 1,
                Singleton::Covered => report.skipped += 1,
            }
        }

        if report.applied > 0 || !report.failed.is_empty() {
            info!(
                applied = report.applied,
                failed = report.failed.len(),
                next_sequence = self.next_sequence(),
                "[rp-02] feed advanced"
            );
        }
        Ok(report)
    }

    /// Re-prove applied sequences of unsettled blocks that lost their
    /// CALCULATED coverage. Transitions of settled blocks are dropped.
    pub async fn repair(&self) -> SequencingResult<usize> {
        let pending: Vec<StateTransition> = self.state.read().applied.values().cloned().collect();

        let mut blocks: BTreeMap<u64, BlockProofState> = BTreeMap::new();
        let mut settled = Vec::new();
        let mut repaired = 0;

        for transition in pending {
            let block = match blocks.entry(transition.block_number) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(self.registry.get_block(transition.block_number).await?)
                }
            };

            if block.is_finished {
                settled.push(transition.sequence);
                continue;
            }
            if block.is_covered(transition.sequence) {
                continue;
            }

            if let Singleton::Accepted = self.prove_and_submit(&transition).await? {
                info!(
                    block = transition.block_number,
                    sequence = transition.sequence,
                    "[rp-02] re-proved rejected coverage"
                );
                repaired += 1;
            }
        }

        if !settled.is_empty() {
            let mut state = self.state.write();
            for sequence in &settled {
                state.applied.remove(sequence);
            }
            debug!(pruned = settled.len(), "[rp-02] dropped settled transitions");
        }

        metrics::record_proofs_repaired(repaired as u64);
        Ok(repaired)
    }

    fn apply_next(&self, operation: &Operation) -> SequencingResult<Applied> {
        let mut state = self.state.write();
        if operation.sequence != state.next_sequence {
            return Ok(Applied::Gap);
        }

        let start_root = state.ledger.state_root()?;
        let mut next = state.ledger.clone();
        if let Err(violation) = next.apply(&operation.kind) {
            state.next_sequence += 1;
            return Ok(Applied::Violation(violation));
        }
        let end_root = next.state_root()?;
        let encoded =
            bincode::serialize(operation).map_err(|e| CodecError::Encode(e.to_string()))?;

        let transition = StateTransition {
            block_number: operation.block_number,
            sequence: operation.sequence,
            start_root,
            end_root,
            operation_digest: blake3_hash(&encoded),
        };

        state.ledger = next;
        state.next_sequence += 1;
        state.applied.insert(operation.sequence, transition.clone());
        Ok(Applied::Transition(transition))
    }

    async fn report_violation(
        &self,
        operation: &Operation,
        violation: LedgerViolation,
        report: &mut FeedReport,
    ) {
        warn!(
            block = operation.block_number,
            sequence = operation.sequence,
            operation = operation.kind.name(),
            %violation,
            "[rp-02] operation rejected by ledger"
        );
        metrics::record_operation_failed(violation.rule());
        self.events
            .publish(ProverEvent::OperationFailed {
                block_number: operation.block_number,
                sequence: operation.sequence,
                reason: violation.to_string(),
            })
            .await;
        report.failed.push(FailedOperation {
            block_number: operation.block_number,
            sequence: operation.sequence,
            violation,
        });
    }

    async fn prove_and_submit(&self, transition: &StateTransition) -> SequencingResult<Singleton> {
        let block = self.registry.get_block(transition.block_number).await?;
        if block.is_covered(transition.sequence) {
            debug!(
                block = transition.block_number,
                sequence = transition.sequence,
                "[rp-02] sequence already covered"
            );
            return Ok(Singleton::Covered);
        }

        let proof = self.prover.prove(transition).await?;
        let handle = self.blobs.save(proof.encode()?).await?;
        let submission =
            ProofSubmission::fresh(transition.block_number, proof.range, handle.clone());

        match self.registry.submit_proof(submission).await? {
            SubmitOutcome::Accepted => {
                metrics::record_proof_submitted("accepted");
                self.events
                    .publish(ProverEvent::ProofSubmitted {
                        block_number: transition.block_number,
                        range: proof.range,
                        handle,
                    })
                    .await;
                Ok(Singleton::Accepted)
            }
            SubmitOutcome::Conflict => {
                metrics::record_proof_submitted("conflict");
                debug!(
                    block = transition.block_number,
                    sequence = transition.sequence,
                    "[rp-02] singleton superseded by concurrent record"
                );
                Ok(Singleton::Covered)
            }
        }
    }
}

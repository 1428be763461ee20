//! In-memory status registry.
//!
//! Every conditional write runs under one write lock, which gives the same
//! guarantees a shared-object ledger gives its callers: a submission either
//! lands completely or not at all.

use crate::error::{RegistryError, RegistryResult};
use crate::ports::outbound::{ProofSubmission, RejectOutcome, StatusRegistry, SubmitOutcome};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    unix_millis, BlockHeader, BlockProofState, ChainStatus, ProofRecord, ProofStatus,
    SequenceRange, StateRoot, TxHandle,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

struct RegistryState {
    blocks: BTreeMap<u64, BlockProofState>,
    headers: BTreeMap<u64, BlockHeader>,
}

/// Shared registry used by the runtime and by tests.
pub struct InMemoryStatusRegistry {
    state: RwLock<RegistryState>,
    accepted: AtomicU64,
    conflicts: AtomicU64,
}

impl InMemoryStatusRegistry {
    /// Registry holding only the settled genesis header.
    pub fn new(genesis_root: StateRoot) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(0, BlockHeader::genesis(genesis_root));
        Self {
            state: RwLock::new(RegistryState {
                blocks: BTreeMap::new(),
                headers,
            }),
            accepted: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
        }
    }

    /// Open a block whose first operation is `start_sequence`.
    pub fn open_block(
        &self,
        block_number: u64,
        start_sequence: u64,
        start_root: StateRoot,
    ) -> RegistryResult<()> {
        let mut state = self.state.write();
        if state.blocks.contains_key(&block_number) {
            return Err(RegistryError::BlockExists { block_number });
        }
        state
            .blocks
            .insert(block_number, BlockProofState::open(block_number, start_sequence));
        state.headers.insert(
            block_number,
            BlockHeader {
                block_number,
                start_root,
                end_root: None,
                settled: false,
                settlement_tx: None,
            },
        );
        debug!(block = block_number, start_sequence, "[rp-01] block opened");
        Ok(())
    }

    /// Close a block at `end_sequence` with its final state root.
    pub fn close_block(
        &self,
        block_number: u64,
        end_sequence: u64,
        end_root: StateRoot,
    ) -> RegistryResult<()> {
        let mut state = self.state.write();
        let block = state
            .blocks
            .get_mut(&block_number)
            .ok_or(RegistryError::BlockNotFound { block_number })?;
        if block.end_sequence.is_some() {
            return Err(RegistryError::InvalidSubmission {
                reason: format!("block {block_number} already closed"),
            });
        }
        if end_sequence < block.start_sequence {
            return Err(RegistryError::InvalidSubmission {
                reason: format!(
                    "block {block_number} end {end_sequence} before start {}",
                    block.start_sequence
                ),
            });
        }
        block.end_sequence = Some(end_sequence);
        if let Some(header) = state.headers.get_mut(&block_number) {
            header.end_root = Some(end_root);
        }
        debug!(block = block_number, end_sequence, "[rp-01] block closed");
        Ok(())
    }

    /// Number of accepted submissions.
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Number of submissions answered with `Conflict`.
    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    fn conflict(&self, submission: &ProofSubmission, reason: &str) -> SubmitOutcome {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
        debug!(
            block = submission.block_number,
            range = %submission.range,
            reason,
            "[rp-01] submission conflict"
        );
        SubmitOutcome::Conflict
    }
}

fn current_index(block: &BlockProofState, range: &SequenceRange) -> Option<usize> {
    block.records.iter().rposition(|r| r.range == *range)
}

/// Move `record` to `next` if the record lifecycle allows it.
fn advance(record: &mut ProofRecord, next: ProofStatus) -> RegistryResult<()> {
    if !record.status.can_transition_to(next) {
        return Err(RegistryError::InvalidSubmission {
            reason: format!("{} cannot move from {} to {next}", record.range, record.status),
        });
    }
    record.status = next;
    Ok(())
}

#[async_trait]
impl StatusRegistry for InMemoryStatusRegistry {
    async fn get_block(&self, block_number: u64) -> RegistryResult<BlockProofState> {
        self.state
            .read()
            .blocks
            .get(&block_number)
            .cloned()
            .ok_or(RegistryError::BlockNotFound { block_number })
    }

    async fn submit_proof(&self, submission: ProofSubmission) -> RegistryResult<SubmitOutcome> {
        let mut state = self.state.write();
        let block_number = submission.block_number;
        let range = submission.range;
        let block = state
            .blocks
            .get_mut(&block_number)
            .ok_or(RegistryError::BlockNotFound { block_number })?;

        if block.is_finished {
            return Ok(self.conflict(&submission, "block finished"));
        }

        let past_end = block.end_sequence.is_some_and(|end| range.end() > end);
        if range.start() < block.start_sequence || past_end {
            return Err(RegistryError::OutOfBlockRange {
                block_number,
                range,
            });
        }

        let consumed = match submission.consumed {
            Some((left, right)) => {
                let joined = left
                    .concat(&right)
                    .map_err(|e| RegistryError::InvalidSubmission {
                        reason: e.to_string(),
                    })?;
                if joined != range {
                    return Err(RegistryError::InvalidSubmission {
                        reason: format!("{left} + {right} does not form {range}"),
                    });
                }
                let consumable = |index: usize| {
                    block.records[index]
                        .status
                        .can_transition_to(ProofStatus::Used)
                };
                match (current_index(block, &left), current_index(block, &right)) {
                    (Some(l), Some(r)) if consumable(l) && consumable(r) => vec![l, r],
                    _ => return Ok(self.conflict(&submission, "input no longer calculated")),
                }
            }
            None => Vec::new(),
        };

        let overlaps = block
            .records
            .iter()
            .enumerate()
            .any(|(i, r)| r.is_calculated() && !consumed.contains(&i) && r.range.overlaps(&range));
        if overlaps {
            return Ok(self.conflict(&submission, "overlaps calculated record"));
        }

        for index in consumed {
            advance(&mut block.records[index], ProofStatus::Used)?;
        }
        block.records.push(ProofRecord::calculated(
            range,
            submission.data_handle.clone(),
            unix_millis(),
        ));
        self.accepted.fetch_add(1, Ordering::Relaxed);

        debug!(
            block = block_number,
            range = %range,
            handle = %submission.data_handle,
            "[rp-01] proof recorded"
        );
        Ok(SubmitOutcome::Accepted)
    }

    async fn reject_proof(
        &self,
        block_number: u64,
        range: SequenceRange,
    ) -> RegistryResult<RejectOutcome> {
        let mut state = self.state.write();
        let block = state
            .blocks
            .get_mut(&block_number)
            .ok_or(RegistryError::BlockNotFound { block_number })?;
        let index = current_index(block, &range).ok_or(RegistryError::RecordNotFound {
            block_number,
            range,
        })?;

        let record = &mut block.records[index];
        if record.status.is_terminal() {
            return Ok(match record.status {
                ProofStatus::Rejected => RejectOutcome::AlreadyRejected,
                _ => RejectOutcome::Consumed,
            });
        }
        advance(record, ProofStatus::Rejected)?;
        Ok(RejectOutcome::Rejected)
    }

    async fn get_block_header(&self, block_number: u64) -> RegistryResult<BlockHeader> {
        self.state
            .read()
            .headers
            .get(&block_number)
            .cloned()
            .ok_or(RegistryError::BlockNotFound { block_number })
    }

    async fn chain_status(&self) -> RegistryResult<ChainStatus> {
        let state = self.state.read();
        let current_block = state.blocks.keys().next_back().copied().unwrap_or(0);
        let last_settled_block = state
            .headers
            .values()
            .take_while(|h| h.settled)
            .map(|h| h.block_number)
            .last()
            .unwrap_or(0);
        Ok(ChainStatus {
            current_block,
            last_settled_block,
        })
    }

    async fn mark_settled(&self, block_number: u64, tx: Option<TxHandle>) -> RegistryResult<()> {
        let mut state = self.state.write();
        let block = state
            .blocks
            .get_mut(&block_number)
            .ok_or(RegistryError::BlockNotFound { block_number })?;
        block.is_finished = true;

        if let Some(header) = state.headers.get_mut(&block_number) {
            header.settled = true;
            if tx.is_some() {
                header.settlement_tx = tx;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::DataHandle;

    fn range(start: u64, end: u64) -> SequenceRange {
        SequenceRange::new(start, end).unwrap()
    }

    fn handle(tag: &str) -> DataHandle {
        DataHandle::new(tag)
    }

    async fn registry_with_singletons(count: u64) -> InMemoryStatusRegistry {
        let registry = InMemoryStatusRegistry::new([0; 32]);
        registry.open_block(1, 1, [0; 32]).unwrap();
        for seq in 1..=count {
            let outcome = registry
                .submit_proof(ProofSubmission::fresh(
                    1,
                    SequenceRange::single(seq),
                    handle(&format!("s{seq}")),
                ))
                .await
                .unwrap();
            assert_eq!(outcome, SubmitOutcome::Accepted);
        }
        registry
    }

    #[tokio::test]
    async fn test_merge_marks_inputs_used() {
        let registry = registry_with_singletons(2).await;

        let outcome = registry
            .submit_proof(ProofSubmission::merged(
                1,
                range(1, 2),
                range(1, 1),
                range(2, 2),
                handle("m"),
            ))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);

        let block = registry.get_block(1).await.unwrap();
        assert_eq!(block.records.len(), 3);
        assert_eq!(block.records[0].status, ProofStatus::Used);
        assert_eq!(block.records[1].status, ProofStatus::Used);
        assert!(block.records[2].is_calculated());
    }

    #[tokio::test]
    async fn test_second_merge_of_same_inputs_conflicts() {
        let registry = registry_with_singletons(2).await;
        let submission =
            ProofSubmission::merged(1, range(1, 2), range(1, 1), range(2, 2), handle("m"));

        registry.submit_proof(submission.clone()).await.unwrap();
        let second = registry.submit_proof(submission).await.unwrap();

        assert_eq!(second, SubmitOutcome::Conflict);
        assert_eq!(registry.conflict_count(), 1);
        assert_eq!(registry.get_block(1).await.unwrap().records.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_singleton_conflicts() {
        let registry = registry_with_singletons(1).await;
        let outcome = registry
            .submit_proof(ProofSubmission::fresh(1, range(1, 1), handle("again")))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_mismatched_consumed_ranges_rejected() {
        let registry = registry_with_singletons(3).await;
        let result = registry
            .submit_proof(ProofSubmission::merged(
                1,
                range(1, 3),
                range(1, 1),
                range(2, 2),
                handle("bad"),
            ))
            .await;
        assert!(matches!(result, Err(RegistryError::InvalidSubmission { .. })));
    }

    #[tokio::test]
    async fn test_range_outside_closed_block() {
        let registry = registry_with_singletons(0).await;
        registry.close_block(1, 4, [4; 32]).unwrap();

        let result = registry
            .submit_proof(ProofSubmission::fresh(1, range(5, 5), handle("x")))
            .await;
        assert!(matches!(result, Err(RegistryError::OutOfBlockRange { .. })));
    }

    #[tokio::test]
    async fn test_reject_is_idempotent() {
        let registry = registry_with_singletons(1).await;

        let first = registry.reject_proof(1, range(1, 1)).await.unwrap();
        let second = registry.reject_proof(1, range(1, 1)).await.unwrap();

        assert_eq!(first, RejectOutcome::Rejected);
        assert_eq!(second, RejectOutcome::AlreadyRejected);
    }

    #[tokio::test]
    async fn test_rejected_range_accepts_replacement() {
        let registry = registry_with_singletons(1).await;
        registry.reject_proof(1, range(1, 1)).await.unwrap();

        let outcome = registry
            .submit_proof(ProofSubmission::fresh(1, range(1, 1), handle("replacement")))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);

        let block = registry.get_block(1).await.unwrap();
        assert_eq!(block.records.len(), 2);
        assert_eq!(
            block.current_record(&range(1, 1)).unwrap().data_handle,
            handle("replacement")
        );
    }

    #[test]
    fn test_advance_follows_record_lifecycle() {
        let mut record = ProofRecord::calculated(range(1, 1), handle("s1"), 0);

        advance(&mut record, ProofStatus::Used).unwrap();
        assert_eq!(record.status, ProofStatus::Used);

        let err = advance(&mut record, ProofStatus::Rejected).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSubmission { .. }));
        assert_eq!(record.status, ProofStatus::Used);

        let mut rejected = ProofRecord::calculated(range(2, 2), handle("s2"), 0);
        advance(&mut rejected, ProofStatus::Rejected).unwrap();
        assert!(advance(&mut rejected, ProofStatus::Calculated).is_err());
    }

    #[tokio::test]
    async fn test_merge_consuming_rejected_input_conflicts() {
        let registry = registry_with_singletons(2).await;
        registry.reject_proof(1, range(2, 2)).await.unwrap();

        let outcome = registry
            .submit_proof(ProofSubmission::merged(
                1,
                range(1, 2),
                range(1, 1),
                range(2, 2),
                handle("m"),
            ))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Conflict);
        let block = registry.get_block(1).await.unwrap();
        assert!(block.records[0].is_calculated());
        assert_eq!(block.records[1].status, ProofStatus::Rejected);
    }

    #[tokio::test]
    async fn test_reject_used_record_reports_consumed() {
        let registry = registry_with_singletons(2).await;
        registry
            .submit_proof(ProofSubmission::merged(
                1,
                range(1, 2),
                range(1, 1),
                range(2, 2),
                handle("m"),
            ))
            .await
            .unwrap();

        let outcome = registry.reject_proof(1, range(1, 1)).await.unwrap();
        assert_eq!(outcome, RejectOutcome::Consumed);
    }

    #[tokio::test]
    async fn test_mark_settled_finishes_block() {
        let registry = registry_with_singletons(1).await;
        registry.close_block(1, 1, [1; 32]).unwrap();

        registry
            .mark_settled(1, Some(TxHandle("tx".into())))
            .await
            .unwrap();

        assert!(registry.get_block(1).await.unwrap().is_finished);
        let header = registry.get_block_header(1).await.unwrap();
        assert!(header.settled);
        assert_eq!(header.settlement_tx, Some(TxHandle("tx".into())));

        let status = registry.chain_status().await.unwrap();
        assert_eq!(status.current_block, 1);
        assert_eq!(status.last_settled_block, 1);
    }

    #[tokio::test]
    async fn test_submissions_to_finished_block_conflict() {
        let registry = registry_with_singletons(1).await;
        registry.mark_settled(1, None).await.unwrap();

        let outcome = registry
            .submit_proof(ProofSubmission::fresh(1, range(2, 2), handle("late")))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_chain_status_stops_at_first_unsettled() {
        let registry = InMemoryStatusRegistry::new([0; 32]);
        registry.open_block(1, 1, [0; 32]).unwrap();
        registry.open_block(2, 3, [0; 32]).unwrap();
        registry.mark_settled(2, None).await.unwrap();

        let status = registry.chain_status().await.unwrap();
        assert_eq!(status.current_block, 2);
        assert_eq!(status.last_settled_block, 0);
    }
}

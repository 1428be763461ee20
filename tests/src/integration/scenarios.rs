//! # Reference Merge Scenarios
//!
//! 1. Four singletons merge pairwise into one record
//! 2. A closed block with two halves finalizes first, then settles
//! 3. A pair whose payload is lost is rejected and not re-selected
//! 4. A merge that overruns its budget is abandoned and cooled down

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rp_01_proof_registry::StatusRegistry;
    use rp_03_proof_merge::{select, CancelToken, MergeOutcome, SelectionHistory, SelectionPhase};
    use rp_04_settlement::SettlementOutcome;
    use shared_bus::{EventFilter, ProverEvent};
    use shared_types::{ProofStatus, SequenceRange};
    use tokio::time::Instant;

    use crate::support::Harness;

    fn range(start: u64, end: u64) -> SequenceRange {
        SequenceRange::new(start, end).unwrap()
    }

    fn status_of(block: &shared_types::BlockProofState, r: SequenceRange) -> ProofStatus {
        block.current_record(&r).unwrap().status
    }

    #[tokio::test]
    async fn scenario_1_singletons_merge_to_one_record() {
        let h = Harness::new();
        h.open_block(1, 1);
        h.add_singletons(1, 1..=4).await;
        let executor = h.executor();
        let mut history = SelectionHistory::new(Duration::from_secs(60));

        let block = h.registry.get_block(1).await.unwrap();
        let first = select(&block, &mut history, Instant::now()).unwrap();
        assert_eq!((first.left.range, first.right.range), (range(1, 1), range(2, 2)));
        assert_eq!(first.phase, SelectionPhase::General);

        let outcome = executor.execute(&first, &CancelToken::never()).await.unwrap();
        assert!(matches!(outcome, MergeOutcome::Merged { range: r, .. } if r == range(1, 2)));

        let block = h.registry.get_block(1).await.unwrap();
        assert_eq!(status_of(&block, range(1, 2)), ProofStatus::Calculated);
        assert_eq!(status_of(&block, range(1, 1)), ProofStatus::Used);
        assert_eq!(status_of(&block, range(2, 2)), ProofStatus::Used);
        assert_eq!(status_of(&block, range(3, 3)), ProofStatus::Calculated);
        assert_eq!(status_of(&block, range(4, 4)), ProofStatus::Calculated);

        // Same snapshot, same history: same answer.
        let now = Instant::now();
        let mut twin = history.clone();
        let a = select(&block, &mut history, now);
        let b = select(&block, &mut twin, now);
        assert_eq!(a, b);

        let mut next = a;
        for _ in 0..8 {
            let Some(candidate) = next else { break };
            executor.execute(&candidate, &CancelToken::never()).await.unwrap();
            let block = h.registry.get_block(1).await.unwrap();
            next = select(&block, &mut history, Instant::now());
        }

        let block = h.registry.get_block(1).await.unwrap();
        let calculated: Vec<_> = block.calculated_records().map(|r| r.range).collect();
        assert_eq!(calculated, vec![range(1, 4)]);
    }

    #[tokio::test]
    async fn scenario_2_finalize_pair_wins_then_block_settles() {
        let h = Harness::with_genesis(crate::support::root(9));
        h.open_block(1, 10);
        h.close_block(1, 14);
        h.record(1, 10, 12).await;
        h.record(1, 13, 14).await;

        let mut history = SelectionHistory::new(Duration::from_secs(60));
        let block = h.registry.get_block(1).await.unwrap();
        let candidate = select(&block, &mut history, Instant::now()).unwrap();
        assert_eq!(candidate.phase, SelectionPhase::Finalize);
        assert_eq!(candidate.left.range, range(10, 12));
        assert_eq!(candidate.right.range, range(13, 14));

        h.executor()
            .execute(&candidate, &CancelToken::never())
            .await
            .unwrap();

        let block = h.registry.get_block(1).await.unwrap();
        assert_eq!(block.final_record().unwrap().range, range(10, 14));

        let outcome = h.submitter().settle_if_ready(1).await.unwrap();
        assert!(matches!(outcome, SettlementOutcome::Settled(_)));
        assert_eq!(h.chain.entry(1).unwrap().memo, "block 1 (5 txs: 10 - 14)");
    }

    #[tokio::test]
    async fn scenario_3_lost_payload_is_rejected_and_skipped() {
        let h = Harness::with_genesis(crate::support::root(4));
        h.open_block(1, 5);
        h.record_lost(1, 5, 6).await;
        h.record(1, 7, 7).await;
        let mut events = h.bus.subscribe(EventFilter::all());

        let mut history = SelectionHistory::new(Duration::from_secs(60));
        let block = h.registry.get_block(1).await.unwrap();
        let candidate = select(&block, &mut history, Instant::now()).unwrap();
        assert_eq!(candidate.left.range, range(5, 6));

        let outcome = h
            .executor()
            .execute(&candidate, &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Rejected(range(5, 6)));

        let block = h.registry.get_block(1).await.unwrap();
        assert_eq!(status_of(&block, range(5, 6)), ProofStatus::Rejected);
        assert_eq!(status_of(&block, range(7, 7)), ProofStatus::Calculated);
        assert!(matches!(
            events.try_recv().unwrap(),
            Some(ProverEvent::ProofRejected { .. })
        ));

        let later = Instant::now() + Duration::from_secs(120);
        assert!(select(&block, &mut history, later).is_none());

        // A fresh record for the same range makes the pair eligible again.
        h.record(1, 5, 6).await;
        let block = h.registry.get_block(1).await.unwrap();
        let again = select(&block, &mut history, later).unwrap();
        assert_eq!(again.left.range, range(5, 6));
        assert!(again.left.is_calculated());
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_4_timed_out_merge_is_abandoned_and_cooled_down() {
        let h = Harness::new();
        h.open_block(1, 1);
        h.add_singletons(1, 1..=2).await;
        let mut events = h.bus.subscribe(EventFilter::all());
        let coordinator =
            h.coordinator_with("slow", h.slow_executor(Duration::from_secs(600)));

        let first = coordinator.run_pass().await.unwrap();
        assert_eq!(first.candidates, 1);
        assert_eq!(first.abandoned, 1);
        assert_eq!(coordinator.active_jobs(), 0);
        assert!(matches!(
            events.try_recv().unwrap(),
            Some(ProverEvent::MergeAbandoned { .. })
        ));

        let suppressed = coordinator.run_pass().await.unwrap();
        assert_eq!(suppressed.candidates, 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        let eligible = coordinator.run_pass().await.unwrap();
        assert_eq!(eligible.candidates, 1);

        let block = h.registry.get_block(1).await.unwrap();
        assert_eq!(block.records.len(), 2);
        assert!(block.records.iter().all(|r| r.is_calculated()));
    }
}

//! # Convergence
//!
//! Contiguous singletons always collapse into one record, whether one
//! coordinator works the block or several race on the same registry.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rp_01_proof_registry::StatusRegistry;
    use shared_types::{BlockProofState, ProofStatus, SequenceRange};

    use crate::support::{Harness, MergeOnlyCoordinator};

    /// No two CALCULATED records overlap and every sequence stays covered.
    fn assert_consistent(block: &BlockProofState, last: u64) {
        let mut calculated: Vec<SequenceRange> =
            block.calculated_records().map(|r| r.range).collect();
        calculated.sort();
        for pair in calculated.windows(2) {
            assert!(!pair[0].overlaps(&pair[1]), "overlap: {} {}", pair[0], pair[1]);
        }
        for sequence in block.start_sequence..=last {
            assert!(block.is_covered(sequence), "sequence {sequence} uncovered");
        }
    }

    async fn drive(coordinator: &MergeOnlyCoordinator, h: &Harness, passes: usize) -> bool {
        for _ in 0..passes {
            coordinator.run_pass().await.unwrap();
            let block = h.registry.get_block(1).await.unwrap();
            if block.calculated_records().count() == 1 {
                return true;
            }
        }
        false
    }

    #[tokio::test]
    async fn test_single_coordinator_converges_for_any_length() {
        for n in 1..=13u64 {
            let h = Harness::new();
            h.open_block(1, 1);
            h.add_singletons(1, 1..=n).await;
            let coordinator = h.coordinator("solo");

            assert!(drive(&coordinator, &h, 4 * n as usize).await, "n = {n} stalled");

            let block = h.registry.get_block(1).await.unwrap();
            let survivors: Vec<_> = block.calculated_records().collect();
            assert_eq!(survivors.len(), 1);
            assert_eq!(survivors[0].range, SequenceRange::new(1, n).unwrap());
            assert!(block
                .records
                .iter()
                .filter(|r| r.range != survivors[0].range)
                .all(|r| r.status == ProofStatus::Used));
        }
    }

    #[tokio::test]
    async fn test_closed_block_converges_and_finalizes() {
        let h = Harness::new();
        h.open_block(1, 1);
        h.close_block(1, 10);
        h.add_singletons(1, 1..=10).await;
        let coordinator = h.coordinator("solo");

        assert!(drive(&coordinator, &h, 40).await);
        let block = h.registry.get_block(1).await.unwrap();
        assert_eq!(
            block.final_record().unwrap().range,
            SequenceRange::new(1, 10).unwrap()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_coordinators_share_one_registry() {
        const N: u64 = 24;
        let h = Arc::new(Harness::new());
        h.open_block(1, 1);
        h.add_singletons(1, 1..=N).await;

        let mut tasks = Vec::new();
        for id in ["a", "b", "c"] {
            let h = Arc::clone(&h);
            let coordinator = h.coordinator(id);
            tasks.push(tokio::spawn(async move {
                let mut merged = 0;
                let mut conflicts = 0;
                for _ in 0..200 {
                    let report = coordinator.run_pass().await.unwrap();
                    merged += report.merged;
                    conflicts += report.conflicts;
                    let block = h.registry.get_block(1).await.unwrap();
                    assert_consistent(&block, N);
                    if block.calculated_records().count() == 1 {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
                (merged, conflicts)
            }));
        }

        let mut total_merged = 0;
        for task in tasks {
            let (merged, _conflicts) = task.await.unwrap();
            total_merged += merged;
        }

        let block = h.registry.get_block(1).await.unwrap();
        let survivors: Vec<_> = block.calculated_records().map(|r| r.range).collect();
        assert_eq!(survivors, vec![SequenceRange::new(1, N).unwrap()]);
        // Each accepted merge removes exactly one CALCULATED record.
        assert_eq!(total_merged as u64, N - 1);
    }
}

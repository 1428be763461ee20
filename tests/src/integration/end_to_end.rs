//! # End-to-End Flow
//!
//! ```text
//! DemoChain ──ops──→ SequencingFeed ──singletons──→ registry
//!                                                      │
//!                         coordinators ──merges────────┤
//!                              │                       │
//!                              └── settle_if_ready ──→ MockSettlementChain
//! ```
//!
//! Loops are driven by hand, one pass at a time, so runs are deterministic.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use prover_runtime::{RuntimeConfig, SubsystemContainer};
    use rp_01_proof_registry::StatusRegistry;
    use shared_bus::{EventFilter, ProverEvent};
    use shared_types::{ProofStatus, SequenceRange};

    fn config(block_size: u64) -> RuntimeConfig {
        RuntimeConfig {
            instance_id: "e2e".to_string(),
            prover_seed: [21; 32],
            poll_interval: Duration::from_millis(10),
            merge_timeout: Duration::from_secs(30),
            dedup_cooldown: Duration::from_secs(60),
            window_blocks: 16,
            coordinators: 2,
            block_size,
            demo_operations: 0,
        }
    }

    /// Run feed and coordinator passes until `target` settles.
    async fn settle_through(container: &SubsystemContainer, target: u64) -> usize {
        let mut repaired = 0;
        for _ in 0..100 {
            repaired += container.feed.run_pass().await.unwrap().repaired;
            for coordinator in &container.coordinators {
                coordinator.run_pass().await.unwrap();
            }
            let status = container.registry.chain_status().await.unwrap();
            if status.last_settled_block >= target {
                return repaired;
            }
        }
        panic!("block {target} never settled");
    }

    #[tokio::test]
    async fn test_operations_flow_to_settlement() {
        let container = SubsystemContainer::new(config(5)).unwrap();
        let mut events = container.bus.subscribe(EventFilter::topics(vec![
            shared_bus::EventTopic::Settlement,
        ]));
        let mut upstream = container.demo_chain();
        for _ in 0..4 {
            upstream.produce_block(u64::MAX).unwrap();
        }

        settle_through(&container, 4).await;

        for block_number in 1..=4u64 {
            let start = (block_number - 1) * 5 + 1;
            let entry = container.chain.entry(block_number).unwrap();
            assert_eq!(entry.range, SequenceRange::new(start, start + 4).unwrap());
            assert_eq!(
                entry.memo,
                format!("block {block_number} (5 txs: {start} - {})", start + 4)
            );

            let header = container.registry.get_block_header(block_number).await.unwrap();
            assert!(header.settled);
            assert_eq!(header.settlement_tx, Some(entry.tx.clone()));
            assert_eq!(header.end_root, Some(entry.end_root));
        }

        let last = container.registry.get_block_header(4).await.unwrap();
        assert_eq!(last.end_root, Some(container.feed.state_root().unwrap()));

        let mut settled = Vec::new();
        while let Ok(Some(ProverEvent::BlockSettled { block_number, .. })) = events.try_recv() {
            settled.push(block_number);
        }
        assert_eq!(settled, vec![1, 2, 3, 4]);

        // Transitions of settled blocks are no longer kept for repair.
        container.feed.run_pass().await.unwrap();
        assert_eq!(container.feed.retained_transitions(), 0);
    }

    #[tokio::test]
    async fn test_lost_singleton_is_regenerated_and_block_settles() {
        let container = SubsystemContainer::new(config(4)).unwrap();
        let mut upstream = container.demo_chain();
        upstream.produce_block(u64::MAX).unwrap();

        container.feed.run_pass().await.unwrap();
        let block = container.registry.get_block(1).await.unwrap();
        let lost = block
            .current_record(&SequenceRange::single(2))
            .unwrap()
            .data_handle
            .clone();
        assert!(container.blobs.forget(&lost));

        let repaired = settle_through(&container, 1).await;
        assert_eq!(repaired, 1);

        let block = container.registry.get_block(1).await.unwrap();
        assert!(block.is_finished);
        assert!(block
            .records
            .iter()
            .any(|r| r.range == SequenceRange::single(2) && r.status == ProofStatus::Rejected));
        assert_eq!(
            block.final_record().unwrap().range,
            SequenceRange::new(1, 4).unwrap()
        );
        assert!(container.chain.entry(1).is_some());
    }
}

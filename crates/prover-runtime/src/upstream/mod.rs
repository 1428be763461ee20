//! # Demo Upstream Chain
//!
//! Stands in for the rollup's sequencer. It runs its own [`AccountLedger`],
//! so the roots it publishes on each block header are the roots the
//! sequencing feed will reach when it replays the same operations.
//!
//! Only operations that apply cleanly are emitted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use rp_01_proof_registry::InMemoryStatusRegistry;
use rp_02_sequencing::{AccountLedger, InMemoryOperationSource};
use shared_types::{AccountId, Operation, OperationKind};

const ACCOUNTS: u64 = 8;
const MAX_DEPOSIT: u64 = 1_000;

/// Produces blocks of random ledger operations.
pub struct DemoChain {
    registry: Arc<InMemoryStatusRegistry>,
    source: Arc<InMemoryOperationSource>,
    ledger: AccountLedger,
    rng: StdRng,
    block_size: u64,
    next_block: u64,
    next_sequence: u64,
}

impl DemoChain {
    pub fn new(
        registry: Arc<InMemoryStatusRegistry>,
        source: Arc<InMemoryOperationSource>,
        block_size: u64,
        seed: u64,
    ) -> Self {
        Self {
            registry,
            source,
            ledger: AccountLedger::new(),
            rng: StdRng::seed_from_u64(seed),
            block_size,
            next_block: 1,
            next_sequence: 1,
        }
    }

    /// Operations emitted so far.
    pub fn produced(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Open a block, sequence up to `block_size` operations into it and close it.
    pub fn produce_block(&mut self, max_operations: u64) -> Result<u64> {
        let count = self.block_size.min(max_operations).max(1);
        let block_number = self.next_block;
        let start_sequence = self.next_sequence;
        let start_root = self.ledger.state_root()?;

        self.registry
            .open_block(block_number, start_sequence, start_root)
            .with_context(|| format!("opening block {block_number}"))?;

        let mut operations = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let kind = self.next_kind();
            self.ledger
                .apply(&kind)
                .map_err(|v| anyhow::anyhow!("generated invalid operation: {v}"))?;
            operations.push(Operation {
                block_number,
                sequence: start_sequence + offset,
                kind,
            });
        }
        self.source.extend(operations);

        let end_sequence = start_sequence + count - 1;
        self.registry
            .close_block(block_number, end_sequence, self.ledger.state_root()?)
            .with_context(|| format!("closing block {block_number}"))?;

        debug!(
            block = block_number,
            start = start_sequence,
            end = end_sequence,
            "[upstream] block produced"
        );
        self.next_block += 1;
        self.next_sequence = end_sequence + 1;
        Ok(block_number)
    }

    /// Produce one block per `interval` until `total` operations exist or
    /// shutdown is signalled.
    pub async fn run(
        mut self,
        total: u64,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.produced() < total {
            tokio::select! {
                _ = ticker.tick() => {
                    let remaining = total - self.produced();
                    self.produce_block(remaining)?;
                    prover_telemetry::CURRENT_BLOCK.set((self.next_block - 1) as f64);
                    prover_telemetry::LOOP_PASSES.with_label_values(&["upstream"]).inc();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
        info!(
            blocks = self.next_block - 1,
            operations = self.produced(),
            "[upstream] demo chain finished producing"
        );
        Ok(())
    }

    fn next_kind(&mut self) -> OperationKind {
        let account = AccountId(self.rng.gen_range(0..ACCOUNTS));
        let balance = self.ledger.account(account).balance;
        match self.rng.gen_range(0..3) {
            1 if balance > 0 => OperationKind::Withdraw {
                account,
                amount: self.rng.gen_range(1..=balance),
            },
            2 if balance > 0 => OperationKind::Transfer {
                from: account,
                to: AccountId((account.0 + self.rng.gen_range(1..ACCOUNTS)) % ACCOUNTS),
                amount: self.rng.gen_range(1..=balance),
            },
            _ => OperationKind::Deposit {
                account,
                amount: self.rng.gen_range(1..=MAX_DEPOSIT),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_01_proof_registry::StatusRegistry;
    use rp_02_sequencing::OperationSource;

    fn chain(
        block_size: u64,
    ) -> (
        DemoChain,
        Arc<InMemoryStatusRegistry>,
        Arc<InMemoryOperationSource>,
    ) {
        let genesis = AccountLedger::new().state_root().unwrap();
        let registry = Arc::new(InMemoryStatusRegistry::new(genesis));
        let source = Arc::new(InMemoryOperationSource::new());
        let chain = DemoChain::new(registry.clone(), source.clone(), block_size, 7);
        (chain, registry, source)
    }

    #[tokio::test]
    async fn test_blocks_are_contiguous() {
        let (mut chain, registry, source) = chain(4);
        assert_eq!(chain.produce_block(100).unwrap(), 1);
        assert_eq!(chain.produce_block(2).unwrap(), 2);

        let first = registry.get_block(1).await.unwrap();
        let second = registry.get_block(2).await.unwrap();
        assert_eq!((first.start_sequence, first.end_sequence), (1, Some(4)));
        assert_eq!((second.start_sequence, second.end_sequence), (5, Some(6)));

        let h1 = registry.get_block_header(1).await.unwrap();
        let h2 = registry.get_block_header(2).await.unwrap();
        assert_eq!(h1.end_root, Some(h2.start_root));
        assert_eq!(source.len(), 6);
        assert_eq!(chain.produced(), 6);
    }

    #[tokio::test]
    async fn test_operations_replay_to_header_root() {
        let (mut chain, registry, source) = chain(16);
        chain.produce_block(16).unwrap();

        let mut replay = AccountLedger::new();
        let operations = source.fetch_operations(1, 16).await.unwrap();
        for operation in &operations {
            replay.apply(&operation.kind).unwrap();
        }
        let header = registry.get_block_header(1).await.unwrap();
        assert_eq!(header.end_root, Some(replay.state_root().unwrap()));
    }
}

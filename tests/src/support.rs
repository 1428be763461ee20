//! Shared fixture for the integration flows.
//!
//! Roots are synthetic: the state after sequence `n` is `root(n)`, so any
//! contiguous run of singletons chains without a real ledger.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use rp_01_proof_registry::{
    BlobStore, InMemoryBlobStore, InMemoryStatusRegistry, ProofSubmission, StatusRegistry,
};
use rp_03_proof_merge::{Coordinator, MergeConfig, MergeExecutor, NoSettlement};
use rp_04_settlement::{MockSettlementChain, SettlementConfig, SettlementSubmitter};
use shared_bus::InMemoryEventBus;
use shared_crypto::{
    blake3_hash, AttestedProofSystem, CryptoResult, ProofMerger, StateTransition,
    StateTransitionProver,
};
use shared_types::{DataHandle, SequenceRange, StateProof, StateRoot};

pub type Executor<M = AttestedProofSystem> =
    MergeExecutor<InMemoryStatusRegistry, InMemoryBlobStore, AttestedProofSystem, M>;

pub type Submitter = SettlementSubmitter<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    AttestedProofSystem,
    MockSettlementChain,
>;

pub type MergeOnlyCoordinator<M = AttestedProofSystem> = Coordinator<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    AttestedProofSystem,
    M,
    NoSettlement,
>;

/// State root after applying sequence `n`.
pub fn root(n: u64) -> StateRoot {
    blake3_hash(&n.to_le_bytes())
}

pub struct Harness {
    pub registry: Arc<InMemoryStatusRegistry>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub system: Arc<AttestedProofSystem>,
    pub bus: Arc<InMemoryEventBus>,
    pub chain: Arc<MockSettlementChain>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::with_genesis(root(0))
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose block 0 ends at `genesis`.
    pub fn with_genesis(genesis: StateRoot) -> Self {
        Self {
            registry: Arc::new(InMemoryStatusRegistry::new(genesis)),
            blobs: Arc::new(InMemoryBlobStore::new()),
            system: Arc::new(AttestedProofSystem::from_seed([11; 32])),
            bus: Arc::new(InMemoryEventBus::new()),
            chain: Arc::new(MockSettlementChain::new()),
        }
    }

    pub fn open_block(&self, block_number: u64, start: u64) {
        self.registry
            .open_block(block_number, start, root(start - 1))
            .expect("open block");
    }

    pub fn close_block(&self, block_number: u64, end: u64) {
        self.registry
            .close_block(block_number, end, root(end))
            .expect("close block");
    }

    /// One proof spanning `start..=end`, built from chained singletons.
    pub async fn prove_range(&self, block_number: u64, start: u64, end: u64) -> StateProof {
        let mut acc: Option<StateProof> = None;
        for sequence in start..=end {
            let step = self
                .system
                .prove(&StateTransition {
                    block_number,
                    sequence,
                    start_root: root(sequence - 1),
                    end_root: root(sequence),
                    operation_digest: [0; 32],
                })
                .await
                .expect("prove");
            acc = Some(match acc {
                None => step,
                Some(left) => self.system.merge(&left, &step).await.expect("merge"),
            });
        }
        acc.expect("non-empty range")
    }

    /// Prove, store and record `start..=end` as one CALCULATED record.
    pub async fn record(&self, block_number: u64, start: u64, end: u64) -> DataHandle {
        let proof = self.prove_range(block_number, start, end).await;
        let handle = self
            .blobs
            .save(proof.encode().expect("encode"))
            .await
            .expect("save");
        self.registry
            .submit_proof(ProofSubmission::fresh(block_number, proof.range, handle.clone()))
            .await
            .expect("submit");
        handle
    }

    /// Record a CALCULATED singleton for each sequence.
    pub async fn add_singletons(
        &self,
        block_number: u64,
        sequences: RangeInclusive<u64>,
    ) -> Vec<DataHandle> {
        let mut handles = Vec::new();
        for sequence in sequences {
            handles.push(self.record(block_number, sequence, sequence).await);
        }
        handles
    }

    /// Record a range whose payload was never stored.
    pub async fn record_lost(&self, block_number: u64, start: u64, end: u64) {
        let range = SequenceRange::new(start, end).expect("range");
        self.registry
            .submit_proof(ProofSubmission::fresh(
                block_number,
                range,
                DataHandle::new(format!("lost-{start}-{end}")),
            ))
            .await
            .expect("submit");
    }

    pub fn executor(&self) -> Arc<Executor> {
        Arc::new(MergeExecutor::new(
            self.registry.clone(),
            self.blobs.clone(),
            self.system.clone(),
            self.system.clone(),
            self.system.verification_key(),
            self.bus.clone(),
        ))
    }

    pub fn slow_executor(&self, delay: Duration) -> Arc<Executor<SlowMerger>> {
        Arc::new(MergeExecutor::new(
            self.registry.clone(),
            self.blobs.clone(),
            self.system.clone(),
            Arc::new(SlowMerger {
                inner: self.system.clone(),
                delay,
            }),
            self.system.verification_key(),
            self.bus.clone(),
        ))
    }

    pub fn submitter(&self) -> Arc<Submitter> {
        Arc::new(SettlementSubmitter::new(
            SettlementConfig::default(),
            self.registry.clone(),
            self.blobs.clone(),
            self.system.clone(),
            self.chain.clone(),
            self.system.verification_key(),
            self.bus.clone(),
        ))
    }

    /// Coordinator that merges but never settles.
    pub fn coordinator(&self, instance_id: &str) -> MergeOnlyCoordinator {
        self.coordinator_with(instance_id, self.executor())
    }

    pub fn coordinator_with<M: ProofMerger + 'static>(
        &self,
        instance_id: &str,
        executor: Arc<Executor<M>>,
    ) -> MergeOnlyCoordinator<M> {
        Coordinator::new(
            MergeConfig {
                instance_id: instance_id.to_string(),
                ..MergeConfig::default()
            },
            self.registry.clone(),
            executor,
            Arc::new(NoSettlement),
            self.bus.clone(),
        )
    }
}

/// Merger that sleeps before delegating.
pub struct SlowMerger {
    inner: Arc<AttestedProofSystem>,
    delay: Duration,
}

#[async_trait]
impl ProofMerger for SlowMerger {
    async fn merge(&self, left: &StateProof, right: &StateProof) -> CryptoResult<StateProof> {
        tokio::time::sleep(self.delay).await;
        self.inner.merge(left, right).await
    }
}

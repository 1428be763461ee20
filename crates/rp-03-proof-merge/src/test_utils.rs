//! Shared fixtures for merge tests.

use crate::executor::MergeExecutor;
use async_trait::async_trait;
use rp_01_proof_registry::{
    BlobStore, InMemoryBlobStore, InMemoryStatusRegistry, ProofSubmission, StatusRegistry,
};
use shared_bus::InMemoryEventBus;
use shared_crypto::{
    blake3_hash, AttestedProofSystem, CryptoResult, ProofMerger, StateTransition,
    StateTransitionProver,
};
use shared_types::{DataHandle, SequenceRange, StateProof, StateRoot};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

pub type TestExecutor<M = AttestedProofSystem> =
    MergeExecutor<InMemoryStatusRegistry, InMemoryBlobStore, AttestedProofSystem, M>;

/// Root after applying sequence `n`.
pub fn root(n: u64) -> StateRoot {
    blake3_hash(&n.to_le_bytes())
}

pub struct Fixture {
    pub registry: Arc<InMemoryStatusRegistry>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub system: Arc<AttestedProofSystem>,
    pub bus: Arc<InMemoryEventBus>,
}

impl Fixture {
    /// Registry with block 1 open at sequence 1.
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryStatusRegistry::new(root(0)));
        registry.open_block(1, 1, root(0)).unwrap();
        Self {
            registry,
            blobs: Arc::new(InMemoryBlobStore::new()),
            system: Arc::new(AttestedProofSystem::from_seed([7; 32])),
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    /// Prove, store and record singletons for `sequences`.
    pub async fn add_singletons(
        &self,
        block_number: u64,
        sequences: RangeInclusive<u64>,
    ) -> Vec<DataHandle> {
        let mut handles = Vec::new();
        for sequence in sequences {
            let proof = self
                .system
                .prove(&StateTransition {
                    block_number,
                    sequence,
                    start_root: root(sequence - 1),
                    end_root: root(sequence),
                    operation_digest: [0; 32],
                })
                .await
                .unwrap();
            let handle = self.blobs.save(proof.encode().unwrap()).await.unwrap();
            self.registry
                .submit_proof(ProofSubmission::fresh(
                    block_number,
                    SequenceRange::single(sequence),
                    handle.clone(),
                ))
                .await
                .unwrap();
            handles.push(handle);
        }
        handles
    }

    pub fn executor(&self) -> Arc<TestExecutor> {
        Arc::new(MergeExecutor::new(
            self.registry.clone(),
            self.blobs.clone(),
            self.system.clone(),
            self.system.clone(),
            self.system.verification_key(),
            self.bus.clone(),
        ))
    }

    pub fn slow_executor(
        &self,
        delay: Duration,
    ) -> Arc<TestExecutor<SlowMerger>> {
        Arc::new(MergeExecutor::new(
            self.registry.clone(),
            self.blobs.clone(),
            self.system.clone(),
            Arc::new(SlowMerger::new(self.system.clone(), delay)),
            self.system.verification_key(),
            self.bus.clone(),
        ))
    }
}

/// Merger that sleeps before delegating.
pub struct SlowMerger {
    inner: Arc<AttestedProofSystem>,
    delay: Duration,
}

impl SlowMerger {
    pub fn new(inner: Arc<AttestedProofSystem>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl ProofMerger for SlowMerger {
    async fn merge(&self, left: &StateProof, right: &StateProof) -> CryptoResult<StateProof> {
        tokio::time::sleep(self.delay).await;
        self.inner.merge(left, right).await
    }
}

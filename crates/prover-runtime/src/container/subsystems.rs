//! # Subsystem Container
//!
//! Holds every subsystem instance, wired to the in-memory adapters.
//!
//! ```text
//! rp-01 registry + blob store
//!   ├── rp-02 sequencing feed (singletons)
//!   ├── rp-03 coordinators × N (merges) ──→ SettlementAdapter
//!   └── rp-04 settlement submitter ←──────────┘
//! ```
//!
//! All subsystems share one event bus.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use rp_01_proof_registry::{InMemoryBlobStore, InMemoryStatusRegistry};
use rp_02_sequencing::{AccountLedger, InMemoryOperationSource, SequencingFeed};
use rp_03_proof_merge::{Coordinator, MergeExecutor};
use rp_04_settlement::{MockSettlementChain, SettlementSubmitter};
use shared_bus::InMemoryEventBus;
use shared_crypto::AttestedProofSystem;

use crate::adapters::SettlementAdapter;
use crate::container::config::RuntimeConfig;
use crate::upstream::DemoChain;

pub type RuntimeFeed = SequencingFeed<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    InMemoryOperationSource,
    AttestedProofSystem,
>;

pub type RuntimeSubmitter = SettlementSubmitter<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    AttestedProofSystem,
    MockSettlementChain,
>;

pub type RuntimeSettlement = SettlementAdapter<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    AttestedProofSystem,
    MockSettlementChain,
>;

pub type RuntimeExecutor = MergeExecutor<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    AttestedProofSystem,
    AttestedProofSystem,
>;

pub type RuntimeCoordinator = Coordinator<
    InMemoryStatusRegistry,
    InMemoryBlobStore,
    AttestedProofSystem,
    AttestedProofSystem,
    RuntimeSettlement,
>;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    pub config: RuntimeConfig,

    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    pub bus: Arc<InMemoryEventBus>,
    pub proof_system: Arc<AttestedProofSystem>,

    // =========================================================================
    // RP-01: REGISTRY
    // =========================================================================
    pub registry: Arc<InMemoryStatusRegistry>,
    pub blobs: Arc<InMemoryBlobStore>,

    // =========================================================================
    // RP-02: SEQUENCING
    // =========================================================================
    pub source: Arc<InMemoryOperationSource>,
    pub feed: Arc<RuntimeFeed>,

    // =========================================================================
    // RP-03: PROOF MERGE
    // =========================================================================
    pub coordinators: Vec<Arc<RuntimeCoordinator>>,

    // =========================================================================
    // RP-04: SETTLEMENT
    // =========================================================================
    pub chain: Arc<MockSettlementChain>,
    pub submitter: Arc<RuntimeSubmitter>,
}

impl SubsystemContainer {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let genesis_root = AccountLedger::new()
            .state_root()
            .context("computing genesis root")?;

        let bus = Arc::new(InMemoryEventBus::new());
        let proof_system = Arc::new(AttestedProofSystem::from_seed(config.prover_seed));
        let verification_key = proof_system.verification_key();

        let registry = Arc::new(InMemoryStatusRegistry::new(genesis_root));
        let blobs = Arc::new(InMemoryBlobStore::new());
        let source = Arc::new(InMemoryOperationSource::new());
        let chain = Arc::new(MockSettlementChain::new());

        let feed = Arc::new(SequencingFeed::new(
            config.sequencing_config(),
            registry.clone(),
            blobs.clone(),
            source.clone(),
            proof_system.clone(),
            bus.clone(),
        ));

        let submitter = Arc::new(SettlementSubmitter::new(
            config.settlement_config(),
            registry.clone(),
            blobs.clone(),
            proof_system.clone(),
            chain.clone(),
            verification_key,
            bus.clone(),
        ));
        let settlement = Arc::new(SettlementAdapter::new(submitter.clone()));

        let executor: Arc<RuntimeExecutor> = Arc::new(MergeExecutor::new(
            registry.clone(),
            blobs.clone(),
            proof_system.clone(),
            proof_system.clone(),
            verification_key,
            bus.clone(),
        ));

        let coordinators = (0..config.coordinators)
            .map(|index| {
                Arc::new(Coordinator::new(
                    config.merge_config(index),
                    registry.clone(),
                    executor.clone(),
                    settlement.clone(),
                    bus.clone(),
                ))
            })
            .collect();

        info!(
            instance = %config.instance_id,
            coordinators = config.coordinators,
            verification_key = %hex::encode(verification_key.0),
            "[runtime] subsystems wired"
        );

        Ok(Self {
            config,
            bus,
            proof_system,
            registry,
            blobs,
            source,
            feed,
            coordinators,
            chain,
            submitter,
        })
    }

    /// Demo sequencer feeding this container's registry and source.
    pub fn demo_chain(&self) -> DemoChain {
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&self.config.prover_seed[..8]);
        DemoChain::new(
            self.registry.clone(),
            self.source.clone(),
            self.config.block_size,
            u64::from_le_bytes(seed),
        )
    }
}

//! # Prover Runtime
//!
//! Wires the prover subsystems together and runs their loops.
//!
//! ## Modules
//!
//! - `container/` - environment configuration and subsystem wiring
//! - `adapters/` - port implementations bridging subsystems
//! - `handlers/` - event bus consumers
//! - `upstream/` - demo sequencer producing blocks of operations
//!
//! ## Tasks
//!
//! ```text
//! upstream ──ops──→ feed loop ──singletons──→ registry ←──merges── coordinator × N
//!                                                                    │
//!                                                     settle_if_ready (rp-04)
//! event bus ──→ event logger (logs + metrics)
//! ```
//!
//! Every task stops when the shared `watch` shutdown flag flips.

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use rp_01_proof_registry::StatusRegistry;
use shared_bus::EventFilter;

pub use container::{ConfigError, RuntimeConfig, SubsystemContainer};

use crate::container::subsystems::RuntimeFeed;
use crate::handlers::EventLogger;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The prover process: subsystems plus the tasks driving them.
pub struct ProverRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ProverRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        info!(instance = %config.instance_id, "Creating rollup prover runtime");
        let container = Arc::new(SubsystemContainer::new(config)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the event logger, demo chain, feed loop and coordinators.
    pub fn start(&self) {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Rollup Prover Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("  Instance: {}", config.instance_id);
        info!("===========================================");

        let mut tasks = self.tasks.lock();

        let logger = EventLogger::new(self.container.bus.subscribe(EventFilter::all()));
        tasks.push(tokio::spawn(logger.run(self.shutdown_rx.clone())));

        let chain = self.container.demo_chain();
        let total = config.demo_operations;
        let interval = config.poll_interval;
        let shutdown = self.shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = chain.run(total, interval, shutdown).await {
                error!(error = %e, "[upstream] demo chain stopped");
            }
        }));

        tasks.push(tokio::spawn(run_feed(
            Arc::clone(&self.container),
            self.shutdown_rx.clone(),
        )));

        for coordinator in &self.container.coordinators {
            let coordinator = Arc::clone(coordinator);
            let shutdown = self.shutdown_rx.clone();
            tasks.push(tokio::spawn(async move { coordinator.run(shutdown).await }));
        }

        info!(
            coordinators = self.container.coordinators.len(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "All prover tasks running"
        );
    }

    /// Signal shutdown and wait for the tasks to drain.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Task ended abnormally"),
                Err(_) => warn!("Task did not stop within the grace period"),
            }
        }
        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}

/// Run feed passes every poll interval and publish chain progress gauges.
async fn run_feed(container: Arc<SubsystemContainer>, mut shutdown: watch::Receiver<bool>) {
    let feed: &RuntimeFeed = &container.feed;
    let mut ticker = tokio::time::interval(container.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = feed.run_pass().await {
                    let kind = if e.is_transient() { "transient" } else { "fatal" };
                    prover_telemetry::SUBSYSTEM_ERRORS
                        .with_label_values(&["rp-02", kind])
                        .inc();
                    warn!(error = %e, "[rp-02] feed pass failed");
                }
                prover_telemetry::LOOP_PASSES.with_label_values(&["feed"]).inc();

                match container.registry.chain_status().await {
                    Ok(status) => {
                        prover_telemetry::CURRENT_BLOCK.set(status.current_block as f64);
                        prover_telemetry::LAST_SETTLED_BLOCK.set(status.last_settled_block as f64);
                    }
                    Err(e) => warn!(error = %e, "[rp-01] chain status unavailable"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("[rp-02] feed loop stopped");
}

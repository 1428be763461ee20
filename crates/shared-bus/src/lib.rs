//! # Shared Bus - Event Bus for Prover Subsystems
//!
//! Subsystems publish what they did (proofs submitted, merged, rejected,
//! blocks settled) and anyone interested subscribes. Nothing on the bus is
//! required for correctness: the status registry remains the single source
//! of truth, and the bus exists for observability and wiring.
//!
//! ## Choreography Pattern
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Sequencing   │                    │  Runtime     │
//! │ Proof Merge  │    publish()       │  event log   │
//! │ Settlement   │ ──────┐            │  + metrics   │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{subsystem, EventFilter, EventTopic, ProverEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;


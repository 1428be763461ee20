//! Publishing side of the bus.

use crate::events::{EventFilter, ProverEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

/// Anything subsystems can report events to.
///
/// Services hold an `Arc<dyn EventPublisher>` so each test can use its own bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Broadcast `event`; returns how many subscribers it reached.
    async fn publish(&self, event: ProverEvent) -> usize;
}

/// Broadcast-channel bus shared by every subsystem in one process.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<ProverEvent>,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Receive events matching `filter` from now on.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: ProverEvent) -> usize {
        let name = event.name();
        let source = event.source_subsystem();
        // no receivers is not an error: the registry, not the bus, is authoritative
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(event = name, source, receivers, "[bus] event published");
        receivers
    }
}

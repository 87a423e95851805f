//! # Hub event bus.
//!
//! Events are published by the hub loop, the observer listener and observer
//! workers, and read by the listener plus any [`HubHandle::events`](crate::HubHandle::events)
//! receiver. Each event is wrapped in an `Arc` once, so fanning it out to many
//! receivers and then to every observer queue never copies the event itself.
//!
//! Publishing never waits. A receiver that falls more than the bus capacity
//! behind gets `RecvError::Lagged(n)`; events published while nobody listens
//! are dropped.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::event::Event;

/// Shared sender side of the event ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Arc<Event>>,
}

impl Bus {
    /// Creates a bus; `capacity` is the ring buffer size (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    /// Publishes an event; returns how many receivers it reached.
    pub fn publish(&self, ev: Event) -> usize {
        self.tx.send(Arc::new(ev)).unwrap_or(0)
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Event>> {
        self.tx.subscribe()
    }
}

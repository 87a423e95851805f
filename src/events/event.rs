//! # Observability events emitted by the hub.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Subscriber events**: admission, voluntary disconnect, eviction
//! - **Message events**: broadcast fan-out results, render failures
//! - **Runtime events**: hub lifecycle and observer trouble
//!
//! The [`Event`] struct carries additional metadata such as the subscriber id,
//! the message origin, its position in history and a reason string.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use fanhub::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SubscriberEvicted)
//!     .with_subscriber("c-1")
//!     .with_reason("full");
//!
//! assert_eq!(ev.kind, EventKind::SubscriberEvicted);
//! assert_eq!(ev.subscriber.as_deref(), Some("c-1"));
//! assert_eq!(ev.reason.as_deref(), Some("full"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of hub events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber admitted and history replayed.
    ///
    /// Sets:
    /// - `subscriber`: subscriber id
    /// - `count`: number of historical payloads enqueued
    SubscriberConnected,

    /// Subscriber removed by an explicit unregister.
    ///
    /// Sets:
    /// - `subscriber`: subscriber id
    SubscriberDisconnected,

    /// Subscriber removed by the hub after a failed delivery.
    ///
    /// Sets:
    /// - `subscriber`: subscriber id
    /// - `reason`: `"full"` or `"closed"`
    SubscriberEvicted,

    /// Register for an id that is already connected; ignored.
    ///
    /// Sets:
    /// - `subscriber`: subscriber id
    DuplicateRegister,

    // === Message events ===
    /// Message appended to history and offered to every live subscriber.
    ///
    /// Sets:
    /// - `origin`: producer id
    /// - `index`: position in history (0-based)
    /// - `count`: number of subscribers that accepted the payload
    MessageBroadcast,

    /// Rendering a message failed; that delivery attempt is skipped.
    ///
    /// Sets:
    /// - `origin`: producer id
    /// - `index`: position in history
    /// - `reason`: renderer error message
    /// - `subscriber`: set only when the failure happened during replay
    RenderFailed,

    // === Runtime events ===
    /// Hub loop started accepting intents.
    HubStarted,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// Hub loop stopped; every subscriber queue has been closed.
    ///
    /// Sets:
    /// - `count`: number of subscribers that were still connected
    HubStopped,

    /// Observer panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,

    /// Events were lost on their way to an observer.
    ///
    /// Drops are coalesced: one event is published when the observer's queue
    /// accepts again (or at shutdown), not one per dropped event.
    ///
    /// Sets:
    /// - `subscriber`: observer name, or `"listener"` when the bus itself lagged
    /// - `reason`: `"full"`, `"closed"` or `"lagged"`
    /// - `count`: number of events lost
    ObserverOverflow,
}

/// Hub event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Subscriber id (or observer name for observer events).
    pub subscriber: Option<Arc<str>>,
    /// Origin id of the message involved.
    pub origin: Option<Arc<str>>,
    /// Position of the message in history.
    pub index: Option<u64>,
    /// Kind-specific counter (replayed, delivered, remaining).
    pub count: Option<u32>,
    /// Human-readable reason (errors, eviction cause, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subscriber: None,
            origin: None,
            index: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a subscriber id.
    #[inline]
    pub fn with_subscriber(mut self, id: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(id.into());
        self
    }

    /// Attaches a message origin id.
    #[inline]
    pub fn with_origin(mut self, origin: impl Into<Arc<str>>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Attaches a history position.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index as u64);
        self
    }

    /// Attaches a counter, saturating at `u32::MAX`.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Reports `lost` events that never reached `observer`.
    pub fn observer_overflow(observer: &'static str, reason: &'static str, lost: u64) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_subscriber(observer)
            .with_reason(reason)
            .with_count(usize::try_from(lost).unwrap_or(usize::MAX))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_subscriber(observer)
            .with_reason(info)
    }
}

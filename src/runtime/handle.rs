//! # Producer/transport handle to a running hub.
//!
//! [`HubHandle`] is cheap to clone and is the only way to reach the hub state.
//! Each method turns a call into an intent on the hub's bounded queue:
//!
//! | Transport callback          | Method                                    |
//! |-----------------------------|-------------------------------------------|
//! | `OnConnect() → handle`      | [`connect`](HubHandle::connect), or [`subscriber`](HubHandle::subscriber) + [`register`](HubHandle::register) |
//! | `OnDisconnect(handle)`      | [`unregister`](HubHandle::unregister)     |
//! | `OnInboundMessage(text, id)`| [`publish`](HubHandle::publish) / [`broadcast`](HubHandle::broadcast) |
//!
//! Awaiting methods wait only for the intent to be accepted (never for
//! delivery); `try_*` methods never wait and return [`HubError::Busy`].
//!
//! ## Example
//! ```rust
//! use fanhub::{Hub, HubConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), fanhub::HubError> {
//!     let hub = Hub::builder(HubConfig::default()).build();
//!     let handle = hub.handle();
//!     let loop_task = tokio::spawn(hub.run());
//!
//!     handle.publish("A", "hello").await?;
//!     let mut stream = handle.connect().await?;
//!     let first = stream.recv().await.expect("replayed");
//!     assert_eq!(first.as_str(), Some("A: hello"));
//!
//!     handle.shutdown();
//!     loop_task.await.ok();
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::HubError;
use crate::events::{Bus, Event};
use crate::messages::{Message, MessageRef, Snapshot};
use crate::runtime::intent::Intent;
use crate::subscribers::{SubscriberHandle, SubscriberId, SubscriberStream};

/// Handle for submitting intents to the hub.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<Intent>,
    bus: Bus,
    token: CancellationToken,
    queue_capacity: usize,
}

impl HubHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<Intent>,
        bus: Bus,
        token: CancellationToken,
        queue_capacity: usize,
    ) -> Self {
        Self {
            tx,
            bus,
            token,
            queue_capacity,
        }
    }

    // ---- Subscribers ----

    /// Connects a new subscriber under a random id.
    ///
    /// The hub sizes the queue to hold the whole history plus
    /// `subscriber_queue_capacity`, replays history, and returns the stream
    /// once the subscriber is admitted: every broadcast submitted after this
    /// returns is delivered live.
    pub async fn connect(&self) -> Result<SubscriberStream, HubError> {
        self.connect_as(SubscriberId::random()).await
    }

    /// Same as [`connect`](Self::connect) with a caller-chosen id.
    ///
    /// If the id is already connected the request is ignored and the returned
    /// stream ends immediately.
    pub async fn connect_as(
        &self,
        id: impl Into<SubscriberId>,
    ) -> Result<SubscriberStream, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Intent::Connect {
            id: id.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Creates an unregistered handle/stream pair with the configured live
    /// capacity. Pass the handle to [`register`](Self::register).
    ///
    /// The queue is **not** enlarged for history; if history does not fit,
    /// the subscriber is evicted during replay.
    pub fn subscriber(&self, id: impl Into<SubscriberId>) -> (SubscriberHandle, SubscriberStream) {
        SubscriberHandle::new(id, self.queue_capacity)
    }

    /// Registers an externally created handle.
    pub async fn register(&self, handle: SubscriberHandle) -> Result<(), HubError> {
        self.send(Intent::Register(handle)).await
    }

    /// Non-blocking [`register`](Self::register).
    pub fn try_register(&self, handle: SubscriberHandle) -> Result<(), HubError> {
        self.try_send(Intent::Register(handle))
    }

    /// Unregisters a subscriber. Unknown ids are ignored.
    pub async fn unregister(&self, id: &SubscriberId) -> Result<(), HubError> {
        self.send(Intent::Unregister(id.clone())).await
    }

    /// Non-blocking [`unregister`](Self::unregister).
    pub fn try_unregister(&self, id: &SubscriberId) -> Result<(), HubError> {
        self.try_send(Intent::Unregister(id.clone()))
    }

    // ---- Messages ----

    /// Appends a message to history and fans it out.
    pub async fn broadcast(&self, message: impl Into<MessageRef>) -> Result<(), HubError> {
        self.send(Intent::Broadcast(message.into())).await
    }

    /// Non-blocking [`broadcast`](Self::broadcast).
    pub fn try_broadcast(&self, message: impl Into<MessageRef>) -> Result<(), HubError> {
        self.try_send(Intent::Broadcast(message.into()))
    }

    /// Shorthand for `broadcast(Message::new(origin_id, text))`.
    pub async fn publish(&self, origin_id: &str, text: &str) -> Result<(), HubError> {
        self.broadcast(Message::new(origin_id, text)).await
    }

    // ---- Queries ----

    /// Point-in-time copy of the history.
    pub async fn history(&self) -> Result<Snapshot, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Intent::History(reply)).await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Sorted ids of currently registered subscribers.
    pub async fn subscribers(&self) -> Result<Vec<SubscriberId>, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Intent::Subscribers(reply)).await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Receiver for hub events published from now on.
    pub fn events(&self) -> broadcast::Receiver<Arc<Event>> {
        self.bus.subscribe()
    }

    // ---- Lifecycle ----

    /// Asks the hub loop to stop. Every subscriber stream ends after draining.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the hub loop no longer accepts intents.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, intent: Intent) -> Result<(), HubError> {
        self.tx.send(intent).await.map_err(|_| HubError::Closed)
    }

    fn try_send(&self, intent: Intent) -> Result<(), HubError> {
        self.tx.try_send(intent).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => HubError::Busy,
            mpsc::error::TrySendError::Closed(_) => HubError::Closed,
        })
    }
}

//! # Per-subscriber delivery queue.
//!
//! A [`SubscriberHandle`] is the hub-side end (owned by the hub while the
//! subscriber is registered); a [`SubscriberStream`] is the transport-side end.
//! Both are created together by [`SubscriberHandle::new`].
//!
//! ## Rules
//! - `try_enqueue` never waits: it reports [`Enqueue::Full`] or [`Enqueue::Closed`].
//! - Dropping the handle closes the queue; the stream still yields every
//!   buffered payload and then `None`.
//! - Dropping the stream makes the next `try_enqueue` return `Closed`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{Semaphore, mpsc};

use crate::render::Payload;
use crate::subscribers::SubscriberId;

/// Outcome of a non-blocking enqueue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enqueue {
    /// Payload buffered.
    Delivered,
    /// Queue at capacity; the transport is not keeping up.
    Full,
    /// Transport side is gone.
    Closed,
}

impl Enqueue {
    /// Label used as eviction reason.
    pub fn as_label(&self) -> &'static str {
        match self {
            Enqueue::Delivered => "delivered",
            Enqueue::Full => "full",
            Enqueue::Closed => "closed",
        }
    }
}

/// Hub-side end of a subscriber queue.
#[derive(Debug)]
pub struct SubscriberHandle {
    id: SubscriberId,
    tx: mpsc::Sender<Payload>,
}

impl SubscriberHandle {
    /// Creates a handle/stream pair with a bounded queue.
    ///
    /// Capacity is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(id: impl Into<SubscriberId>, capacity: usize) -> (Self, SubscriberStream) {
        let id = id.into();
        let (tx, rx) = mpsc::channel(capacity.clamp(1, Semaphore::MAX_PERMITS));
        (
            Self { id: id.clone(), tx },
            SubscriberStream { id, rx },
        )
    }

    /// Subscriber id.
    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    /// Non-blocking enqueue.
    pub fn try_enqueue(&self, payload: Payload) -> Enqueue {
        match self.tx.try_send(payload) {
            Ok(()) => Enqueue::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => Enqueue::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Enqueue::Closed,
        }
    }

    /// Closes the queue. Buffered payloads stay readable.
    pub fn close(self) {
        drop(self);
    }
}

/// Transport-side end of a subscriber queue.
#[derive(Debug)]
pub struct SubscriberStream {
    id: SubscriberId,
    rx: mpsc::Receiver<Payload>,
}

impl SubscriberStream {
    /// Subscriber id; pass it to [`HubHandle::unregister`](crate::HubHandle::unregister).
    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    /// Waits for the next payload; `None` once the hub closed the queue and
    /// every buffered payload has been read.
    pub async fn recv(&mut self) -> Option<Payload> {
        self.rx.recv().await
    }

    /// Returns a buffered payload without waiting.
    pub fn try_recv(&mut self) -> Option<Payload> {
        self.rx.try_recv().ok()
    }

    /// Returns `true` once the hub side is gone and nothing is buffered.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed() && self.rx.is_empty()
    }
}

impl Stream for SubscriberStream {
    type Item = Payload;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Payload>> {
        self.rx.poll_recv(cx)
    }
}

//! # fanhub
//!
//! **fanhub** is an in-process message broadcast hub for Rust.
//!
//! A single coordinator admits subscribers, records every message in order,
//! replays that history to each newcomer, and fans each new message out to
//! every connected subscriber without ever waiting on a slow one: a
//! subscriber whose queue is full is disconnected instead.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   transport A        transport B          any producer
//!   (connection)       (connection)         (bot, system)
//!        │ connect          │ connect            │ broadcast
//!        ▼                  ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  HubHandle (cloneable) ──► bounded intent queue                   │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Hub loop (one task, one intent at a time)                        │
//! │  - HubState.clients   (SubscriberId → SubscriberHandle)           │
//! │  - HubState.messages  (MessageStore, append-only)                 │
//! │  - Render             (Message → Payload, once per broadcast)     │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        │ try_enqueue      │ try_enqueue      │ try_enqueue   │ publish
//!        ▼                  ▼                  ▼               ▼
//!    [queue A]          [queue B]          [queue N]          Bus ──► ObserverSet
//!        │                  │                  │                       └─► LogWriter
//!        ▼                  ▼                  ▼
//!  SubscriberStream   SubscriberStream   SubscriberStream
//! ```
//!
//! ### Subscriber lifecycle
//! ```text
//! Created ──register──► Registered ──┬─ unregister ──► Unregistered
//!                        │           └─ queue full/closed ──► Evicted
//!                        └─ history replayed, then live broadcasts
//! ```
//!
//! ## Guarantees
//! - Every subscriber observes messages in the single global history order.
//! - Replay-then-live has no gaps and no duplicates.
//! - A broadcast submitted after `connect` returns is delivered live.
//! - The hub never blocks on a subscriber; full or closed queues evict.
//! - A render failure drops one delivery attempt only; history keeps the message.
//!
//! ## Features
//! | Area              | Description                                         | Key types / traits                       |
//! |-------------------|-----------------------------------------------------|------------------------------------------|
//! | **Hub**           | Coordinator loop, builder, configuration.           | [`Hub`], [`HubHandle`], [`HubConfig`]    |
//! | **Subscribers**   | Per-subscriber bounded queues.                      | [`SubscriberStream`], [`SubscriberId`]   |
//! | **Messages**      | Immutable messages and append-only history.         | [`Message`], [`MessageStore`], [`Snapshot`] |
//! | **Rendering**     | Message → payload, pluggable.                       | [`Render`], [`RenderFn`], [`Template`]   |
//! | **Observability** | Events and observers.                               | [`Event`], [`EventKind`], [`Observe`]    |
//! | **Errors**        | Typed errors.                                       | [`HubError`], [`RenderError`]            |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], an observer writing `tracing` records.
//!
//! ## Example
//! ```rust
//! use fanhub::{Hub, HubConfig, Message};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), fanhub::HubError> {
//!     let (hub, task) = Hub::builder(HubConfig::default()).build().spawn();
//!
//!     hub.broadcast(Message::new("A", "hello")).await?;
//!     hub.broadcast(Message::new("B", "world")).await?;
//!
//!     let mut c = hub.connect_as("C").await?;
//!     assert_eq!(c.recv().await.unwrap().as_str(), Some("A: hello"));
//!     assert_eq!(c.recv().await.unwrap().as_str(), Some("B: world"));
//!
//!     hub.unregister(c.id()).await?;
//!     assert!(c.recv().await.is_none());
//!
//!     hub.shutdown();
//!     task.await.ok();
//!     Ok(())
//! }
//! ```

mod error;
mod events;
mod messages;
mod observers;
mod render;
mod runtime;
mod subscribers;

// ---- Public re-exports ----

pub use error::{HubError, RenderError};
pub use events::{Event, EventKind};
pub use messages::{Message, MessageRef, MessageStore, Snapshot};
pub use observers::Observe;
pub use render::{Payload, PlainText, Render, RenderFn, RenderRef, Template};
pub use runtime::{Hub, HubBuilder, HubConfig, HubHandle};
pub use subscribers::{Enqueue, SubscriberHandle, SubscriberId, SubscriberStream};

#[cfg(feature = "logging")]
pub use observers::embedded::LogWriter;

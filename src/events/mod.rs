//! Hub events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to observability events emitted by the hub coordinator
//! and the observer workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the hub loop (connect/disconnect/evict/render failures,
//!   lifecycle) and `ObserverSet` workers (overflow/panic).
//! - **Consumers**: the observer listener spawned by `Hub::run` (fans out to
//!   `ObserverSet`), plus anything holding [`HubHandle::events`](crate::HubHandle::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

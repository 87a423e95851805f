//! Hub subscribers: ids and per-subscriber delivery queues.
//!
//! ## Architecture
//! ```text
//!          hub loop (single writer)                 transport (single reader)
//! SubscriberHandle::try_enqueue ──► [bounded mpsc] ──► SubscriberStream::recv
//!                  │                                         │
//!   dropped on unregister/evict ──► stream drains, then None │
//!                                   stream dropped ──► next try_enqueue = Closed
//! ```

mod id;
mod queue;

pub use id::SubscriberId;
pub use queue::{Enqueue, SubscriberHandle, SubscriberStream};

//! Messages and their in-memory history.
//!
//! - [`Message`] immutable `{origin_id, text}` value shared via `Arc`
//! - [`MessageStore`] append-only history owned by the hub loop
//! - [`Snapshot`] point-in-time view used for replay

mod message;
mod store;

pub use message::{Message, MessageRef};
pub use store::{MessageStore, Snapshot};

//! # Append-only message history.
//!
//! [`MessageStore`] is owned by the hub loop and only mutated there. It keeps
//! every message ever broadcast, in insertion order, so new subscribers can be
//! brought up to date.
//!
//! ## Rules
//! - `append` is O(1) amortized and never fails.
//! - `snapshot` copies the `Arc` pointers, not the messages; the returned
//!   [`Snapshot`] holds no lock and is unaffected by later appends.
//! - No eviction: history grows for the lifetime of the hub.

use std::sync::Arc;

use super::message::MessageRef;

/// Ordered, append-only message history.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<MessageRef>,
}

impl MessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its position.
    pub fn append(&mut self, message: MessageRef) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Point-in-time copy of the history.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: Arc::from(self.messages.as_slice()),
        }
    }

    /// Borrowing iterator in insertion order (hub-internal replay).
    pub(crate) fn iter(&self) -> impl Iterator<Item = &MessageRef> {
        self.messages.iter()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing was ever appended.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Immutable view of the history at the instant it was taken.
///
/// Cheap to clone and restartable: every call to [`Snapshot::iter`] starts
/// again from the oldest message.
#[derive(Clone, Debug)]
pub struct Snapshot {
    messages: Arc<[MessageRef]>,
}

impl Snapshot {
    /// Iterates messages oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, MessageRef> {
        self.messages.iter()
    }

    /// Number of messages in the view.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&MessageRef> {
        self.messages.get(index)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a MessageRef;
    type IntoIter = std::slice::Iter<'a, MessageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

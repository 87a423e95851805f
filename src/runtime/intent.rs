//! Intents accepted by the hub loop.
//!
//! Every state transition is one intent; the loop applies them strictly in
//! arrival order. Queries carry a `oneshot` reply and observe the state as of
//! their position in that order.

use tokio::sync::oneshot;

use crate::messages::{MessageRef, Snapshot};
use crate::subscribers::{SubscriberHandle, SubscriberId, SubscriberStream};

pub(crate) enum Intent {
    /// Admit an externally created handle and replay history.
    Register(SubscriberHandle),
    /// Create a history-sized queue for `id`, admit it, reply with the stream.
    Connect {
        id: SubscriberId,
        reply: oneshot::Sender<SubscriberStream>,
    },
    /// Remove and close; no-op for unknown ids.
    Unregister(SubscriberId),
    /// Append and fan out.
    Broadcast(MessageRef),
    /// Point-in-time history.
    History(oneshot::Sender<Snapshot>),
    /// Sorted ids of registered subscribers.
    Subscribers(oneshot::Sender<Vec<SubscriberId>>),
}

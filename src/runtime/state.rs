//! # Hub state machine.
//!
//! [`HubState`] owns the subscriber set and the message history. It is only
//! ever touched by the hub loop, one [`Intent`] at a time, so it needs no
//! locking of its own.
//!
//! ## Per-subscriber lifecycle
//! ```text
//! Created ──register/connect──► Registered ──unregister──► Unregistered
//!                                   │
//!                                   └──full/closed queue──► Evicted
//! ```
//! Both terminal states drop the [`SubscriberHandle`], which closes the queue.
//!
//! ## Rules
//! - Replay and live delivery share one global order: history order.
//! - Delivery is `try_enqueue` only; a full or closed queue evicts.
//! - A render failure skips that delivery attempt and nothing else.
//! - Renderer panics are caught and treated as render failures.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::sync::oneshot;

use crate::error::RenderError;
use crate::events::{Bus, Event, EventKind};
use crate::messages::{Message, MessageRef, MessageStore};
use crate::render::{Payload, RenderRef};
use crate::runtime::intent::Intent;
use crate::subscribers::{Enqueue, SubscriberHandle, SubscriberId, SubscriberStream};

/// Working set of the hub coordinator.
pub(crate) struct HubState {
    clients: HashMap<SubscriberId, SubscriberHandle>,
    messages: MessageStore,
    renderer: RenderRef,
    bus: Bus,
    live_capacity: usize,
}

impl HubState {
    pub(crate) fn new(renderer: RenderRef, bus: Bus, live_capacity: usize) -> Self {
        Self {
            clients: HashMap::new(),
            messages: MessageStore::new(),
            renderer,
            bus,
            live_capacity: live_capacity.max(1),
        }
    }

    /// Applies one intent.
    pub(crate) fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Register(handle) => self.register(handle),
            Intent::Connect { id, reply } => self.connect(id, reply),
            Intent::Unregister(id) => self.unregister(&id),
            Intent::Broadcast(message) => self.broadcast(message),
            Intent::History(reply) => {
                let _ = reply.send(self.messages.snapshot());
            }
            Intent::Subscribers(reply) => {
                let _ = reply.send(self.subscriber_ids());
            }
        }
    }

    /// Admits a handle and replays history onto its queue.
    pub(crate) fn register(&mut self, handle: SubscriberHandle) {
        if self.clients.contains_key(handle.id()) {
            self.bus.publish(
                Event::new(EventKind::DuplicateRegister).with_subscriber(handle.id().as_arc()),
            );
            return;
        }

        let replay = self.replay(&handle);
        let id = handle.id().clone();
        self.clients.insert(id.clone(), handle);

        let (count, failed) = match replay {
            Ok(count) => (count, None),
            Err((count, outcome)) => (count, Some(outcome)),
        };
        self.bus.publish(
            Event::new(EventKind::SubscriberConnected)
                .with_subscriber(id.as_arc())
                .with_count(count),
        );
        if let Some(outcome) = failed {
            self.evict(&id, outcome);
        }
    }

    /// Creates a queue sized for history plus live headroom, then registers it.
    fn connect(&mut self, id: SubscriberId, reply: oneshot::Sender<SubscriberStream>) {
        let capacity = self.messages.len().saturating_add(self.live_capacity);
        let (handle, stream) = SubscriberHandle::new(id, capacity);
        self.register(handle);
        let _ = reply.send(stream);
    }

    /// Removes a subscriber; no-op if it is not registered.
    pub(crate) fn unregister(&mut self, id: &SubscriberId) {
        if let Some(handle) = self.clients.remove(id) {
            handle.close();
            self.bus.publish(
                Event::new(EventKind::SubscriberDisconnected).with_subscriber(id.as_arc()),
            );
        }
    }

    /// Appends to history and offers the rendered payload to every subscriber.
    pub(crate) fn broadcast(&mut self, message: MessageRef) {
        let index = self.messages.append(MessageRef::clone(&message));

        let payload = match self.render(&message) {
            Ok(p) => p,
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::RenderFailed)
                        .with_origin(message.origin_arc())
                        .with_index(index)
                        .with_reason(e.to_string()),
                );
                return;
            }
        };

        let mut dead = Vec::new();
        for (id, handle) in &self.clients {
            match handle.try_enqueue(payload.clone()) {
                Enqueue::Delivered => {}
                outcome => dead.push((id.clone(), outcome)),
            }
        }

        let delivered = self.clients.len() - dead.len();
        for (id, outcome) in dead {
            self.evict(&id, outcome);
        }

        self.bus.publish(
            Event::new(EventKind::MessageBroadcast)
                .with_origin(message.origin_arc())
                .with_index(index)
                .with_count(delivered),
        );
    }

    /// Closes every queue; used when the loop stops.
    pub(crate) fn close_all(&mut self) -> usize {
        let n = self.clients.len();
        self.clients.clear();
        n
    }

    pub(crate) fn subscriber_ids(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = self.clients.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.messages.len()
    }

    /// Enqueues history in order. On a failed enqueue returns how many
    /// payloads made it and why the rest did not.
    fn replay(&self, handle: &SubscriberHandle) -> Result<usize, (usize, Enqueue)> {
        let mut count = 0;
        for (index, message) in self.messages.iter().enumerate() {
            let payload = match self.render(message) {
                Ok(p) => p,
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::RenderFailed)
                            .with_origin(message.origin_arc())
                            .with_index(index)
                            .with_subscriber(handle.id().as_arc())
                            .with_reason(e.to_string()),
                    );
                    continue;
                }
            };
            match handle.try_enqueue(payload) {
                Enqueue::Delivered => count += 1,
                outcome => return Err((count, outcome)),
            }
        }
        Ok(count)
    }

    fn evict(&mut self, id: &SubscriberId, outcome: Enqueue) {
        if let Some(handle) = self.clients.remove(id) {
            handle.close();
            self.bus.publish(
                Event::new(EventKind::SubscriberEvicted)
                    .with_subscriber(id.as_arc())
                    .with_reason(outcome.as_label()),
            );
        }
    }

    fn render(&self, message: &Message) -> Result<Payload, RenderError> {
        let renderer = &self.renderer;
        match catch_unwind(AssertUnwindSafe(|| renderer.render(message))) {
            Ok(res) => res,
            Err(_) => Err(RenderError::failed(format!(
                "renderer {} panicked",
                renderer.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PlainText, RenderFn};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn state() -> (HubState, tokio::sync::broadcast::Receiver<Arc<Event>>) {
        let bus = Bus::new(64);
        let rx = bus.subscribe();
        (HubState::new(Arc::new(PlainText), bus, 4), rx)
    }

    fn drain(stream: &mut SubscriberStream) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(p) = stream.try_recv() {
            out.push(p.as_str().unwrap().to_string());
        }
        out
    }

    fn kinds(rx: &mut tokio::sync::broadcast::Receiver<Arc<Event>>) -> Vec<EventKind> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev.kind);
        }
        out
    }

    #[test]
    fn register_replays_history_in_order() {
        let (mut st, _rx) = state();
        st.broadcast(Message::arc("A", "hello"));
        st.broadcast(Message::arc("B", "world"));

        let (handle, mut stream) = SubscriberHandle::new("C", 8);
        st.register(handle);

        assert_eq!(drain(&mut stream), vec!["A: hello", "B: world"]);
        assert_eq!(st.subscriber_ids(), vec![SubscriberId::from("C")]);
    }

    #[test]
    fn duplicate_register_keeps_first_handle() {
        let (mut st, mut rx) = state();
        let (first, mut first_stream) = SubscriberHandle::new("C", 8);
        let (second, mut second_stream) = SubscriberHandle::new("C", 8);
        st.register(first);
        st.register(second);

        st.broadcast(Message::arc("A", "x"));
        assert_eq!(drain(&mut first_stream), vec!["A: x"]);
        assert!(second_stream.try_recv().is_none());
        assert!(second_stream.is_closed());
        assert!(kinds(&mut rx).contains(&EventKind::DuplicateRegister));
    }

    #[test]
    fn unregister_is_idempotent_and_reports_once() {
        let (mut st, mut rx) = state();
        let (handle, stream) = SubscriberHandle::new("C", 8);
        st.register(handle);

        let id = stream.id().clone();
        st.unregister(&id);
        st.unregister(&id);

        let disconnects = kinds(&mut rx)
            .into_iter()
            .filter(|k| *k == EventKind::SubscriberDisconnected)
            .count();
        assert_eq!(disconnects, 1);
        assert!(stream.is_closed());
    }

    #[test]
    fn full_queue_evicts_without_blocking() {
        let (mut st, mut rx) = state();
        let (handle, _stream) = SubscriberHandle::new("slow", 2);
        st.register(handle);

        for i in 0..3 {
            st.broadcast(Message::arc("A", format!("m{i}")));
        }
        assert!(st.subscriber_ids().is_empty());
        assert!(kinds(&mut rx).contains(&EventKind::SubscriberEvicted));

        st.broadcast(Message::arc("A", "after"));
        assert_eq!(st.history_len(), 4);
    }

    #[test]
    fn dropped_stream_is_evicted_as_closed() {
        let (mut st, mut rx) = state();
        let (handle, stream) = SubscriberHandle::new("gone", 2);
        st.register(handle);
        drop(stream);

        st.broadcast(Message::arc("A", "x"));
        assert!(st.subscriber_ids().is_empty());

        let evicted = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::SubscriberEvicted)
            .unwrap();
        assert_eq!(evicted.reason.as_deref(), Some("closed"));
    }

    #[test]
    fn replay_overflow_evicts_registered_handle() {
        let (mut st, _rx) = state();
        for i in 0..3 {
            st.broadcast(Message::arc("A", format!("m{i}")));
        }
        let (handle, mut stream) = SubscriberHandle::new("tiny", 2);
        st.register(handle);

        assert!(st.subscriber_ids().is_empty());
        assert_eq!(drain(&mut stream), vec!["A: m0", "A: m1"]);
        assert!(stream.is_closed());
    }

    #[test]
    fn connect_sizes_queue_for_history() {
        let (mut st, _rx) = state();
        for i in 0..10 {
            st.broadcast(Message::arc("A", format!("m{i}")));
        }
        let (reply, mut rx) = oneshot::channel();
        st.connect(SubscriberId::from("late"), reply);
        let mut stream = rx.try_recv().unwrap();

        assert_eq!(drain(&mut stream).len(), 10);
        assert_eq!(st.subscriber_ids(), vec![SubscriberId::from("late")]);
    }

    #[test]
    fn live_render_failure_skips_delivery_but_keeps_history() {
        let broken = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&broken);
        let renderer = RenderFn::arc("flaky", move |m: &Message| {
            if m.text() == "world" && flag.load(Ordering::SeqCst) {
                Err(RenderError::failed("template missing"))
            } else {
                Ok(Payload::from(m.text()))
            }
        });
        let mut st = HubState::new(renderer, Bus::new(16), 8);

        let (c, mut c_stream) = SubscriberHandle::new("C", 8);
        st.register(c);
        st.broadcast(Message::arc("A", "hello"));
        st.broadcast(Message::arc("B", "world"));
        assert_eq!(drain(&mut c_stream), vec!["hello"]);
        assert_eq!(st.subscriber_ids().len(), 1);

        broken.store(false, Ordering::SeqCst);
        let (d, mut d_stream) = SubscriberHandle::new("D", 8);
        st.register(d);
        assert_eq!(drain(&mut d_stream), vec!["hello", "world"]);
        assert!(c_stream.try_recv().is_none());
    }

    #[test]
    fn replay_render_failure_skips_only_that_message() {
        let renderer = RenderFn::arc("picky", |m: &Message| {
            if m.text() == "m1" {
                Err(RenderError::failed("cannot render m1"))
            } else {
                Ok(Payload::from(m.text()))
            }
        });
        let bus = Bus::new(64);
        let mut st = HubState::new(renderer, bus.clone(), 8);
        for i in 0..3 {
            st.broadcast(Message::arc("A", format!("m{i}")));
        }

        let mut rx = bus.subscribe();
        let (d, mut d_stream) = SubscriberHandle::new("D", 8);
        st.register(d);

        assert_eq!(drain(&mut d_stream), vec!["m0", "m2"]);
        assert_eq!(st.subscriber_ids(), vec![SubscriberId::from("D")]);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        let failed = events
            .iter()
            .find(|ev| ev.kind == EventKind::RenderFailed)
            .unwrap();
        assert_eq!(failed.subscriber.as_deref(), Some("D"));
        assert_eq!(failed.index, Some(1));

        let connected = events
            .iter()
            .find(|ev| ev.kind == EventKind::SubscriberConnected)
            .unwrap();
        assert_eq!(connected.count, Some(2));
    }

    #[test]
    fn renderer_panic_is_a_render_failure() {
        let renderer = RenderFn::arc("boom", |_m: &Message| -> Result<Payload, RenderError> {
            panic!("renderer exploded")
        });
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut st = HubState::new(renderer, bus, 8);

        st.broadcast(Message::arc("A", "x"));
        assert_eq!(st.history_len(), 1);

        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::RenderFailed)
            .unwrap();
        assert_eq!(failed.reason.as_deref(), Some("render failed: renderer boom panicked"));
    }

    #[test]
    fn close_all_ends_every_stream() {
        let (mut st, _rx) = state();
        let (a, a_stream) = SubscriberHandle::new("a", 2);
        let (b, b_stream) = SubscriberHandle::new("b", 2);
        st.register(a);
        st.register(b);

        assert_eq!(st.close_all(), 2);
        assert!(a_stream.is_closed());
        assert!(b_stream.is_closed());
    }
}

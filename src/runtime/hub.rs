//! # Hub: the serialized coordinator loop.
//!
//! The [`Hub`] owns the intent receiver and, once [`run`](Hub::run), the
//! [`HubState`]. Nothing else can reach the subscriber set or the history.
//!
//! ## High-level architecture
//! ```text
//! producers / transports                     hub loop (one task)
//!   HubHandle::connect ──┐
//!   HubHandle::register ─┼──► [intent mpsc] ──► HubState::apply(intent)
//!   HubHandle::broadcast ┤     (bounded)              │
//!   HubHandle::unregister┘                           ├──► try_enqueue ──► [queue] ──► SubscriberStream
//!                                                    └──► Bus.publish(Event)
//!                                                              │
//!                                       observer listener ◄────┘
//!                                              └──► ObserverSet::emit ──► LogWriter, ...
//! ```
//!
//! ## Stop conditions
//! - the hub's `CancellationToken` is cancelled ([`HubHandle::shutdown`]),
//! - every [`HubHandle`] has been dropped,
//! - ([`run_until_shutdown`](Hub::run_until_shutdown) only) an OS termination signal.
//!
//! On stop: all subscriber queues are closed, `HubStopped` is published, and
//! observer workers are drained before `run` returns.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::observers::{Observe, ObserverSet};
use crate::render::RenderRef;
use crate::runtime::handle::HubHandle;
use crate::runtime::intent::Intent;
use crate::runtime::state::HubState;
use crate::runtime::{HubBuilder, HubConfig, shutdown};

/// Broadcast hub coordinator. Build with [`Hub::builder`], start with [`Hub::run`].
pub struct Hub {
    cfg: HubConfig,
    bus: Bus,
    renderer: RenderRef,
    observers: Vec<Arc<dyn Observe>>,
    handle: HubHandle,
    rx: mpsc::Receiver<Intent>,
    token: CancellationToken,
}

impl Hub {
    /// Returns a builder for the given configuration.
    pub fn builder(cfg: HubConfig) -> HubBuilder {
        HubBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: HubConfig,
        renderer: RenderRef,
        observers: Vec<Arc<dyn Observe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel(cfg.intent_capacity_clamped());
        let handle = HubHandle::new(
            tx,
            bus.clone(),
            token.clone(),
            cfg.subscriber_queue_capacity_clamped(),
        );
        Self {
            cfg,
            bus,
            renderer,
            observers,
            handle,
            rx,
            token,
        }
    }

    /// Returns a new handle. Take every handle you need before calling `run`.
    pub fn handle(&self) -> HubHandle {
        self.handle.clone()
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawns [`run`](Self::run) on the current runtime and returns a handle.
    pub fn spawn(self) -> (HubHandle, JoinHandle<()>) {
        let handle = self.handle();
        (handle, tokio::spawn(self.run()))
    }

    /// Runs the loop until cancelled or until every [`HubHandle`] is dropped.
    pub async fn run(self) {
        let Hub {
            cfg,
            bus,
            renderer,
            observers,
            handle,
            mut rx,
            token,
        } = self;
        drop(handle);

        let listener = ObserverListener::spawn(observers, &bus);
        let live_capacity = cfg.subscriber_queue_capacity_clamped();
        let mut state = HubState::new(renderer, bus.clone(), live_capacity);
        bus.publish(Event::new(EventKind::HubStarted));

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                intent = rx.recv() => match intent {
                    Some(intent) => state.apply(intent),
                    None => break,
                },
            }
        }

        rx.close();
        let remaining = state.close_all();
        bus.publish(Event::new(EventKind::HubStopped).with_count(remaining));

        if let Some(listener) = listener {
            listener.shutdown().await;
        }
    }

    /// Like [`run`](Self::run), additionally stopping on SIGINT/SIGTERM/SIGQUIT
    /// (Ctrl-C on non-unix).
    pub async fn run_until_shutdown(self) {
        let token = self.token.clone();
        let bus = self.bus.clone();

        let watcher = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                res = shutdown::shutdown_signal() => {
                    if let Ok(name) = res {
                        bus.publish(Event::new(EventKind::ShutdownRequested).with_reason(name));
                        token.cancel();
                    }
                }
            }
        });

        self.run().await;
        watcher.abort();
    }
}

/// Forwards bus events into the observer set until stopped.
///
/// If the listener itself falls behind the bus, observers get an
/// `ObserverOverflow` from `"listener"` with reason `lagged`. It goes straight
/// into the set: publishing it on a full bus would push out the next unread
/// event and lag the listener again.
struct ObserverListener {
    stop: CancellationToken,
    join: JoinHandle<ObserverSet>,
}

impl ObserverListener {
    /// Subscribes synchronously so no event published after this call is missed.
    fn spawn(observers: Vec<Arc<dyn Observe>>, bus: &Bus) -> Option<Self> {
        if observers.is_empty() {
            return None;
        }
        let mut set = ObserverSet::new(observers, bus.clone());
        let mut rx = bus.subscribe();
        let stop = CancellationToken::new();
        let stop_rx = stop.clone();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(ev),
                        Err(RecvError::Lagged(n)) => set.emit(lagged(n)),
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop_rx.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(ev),
                                Err(TryRecvError::Lagged(n)) => set.emit(lagged(n)),
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set
        });
        Some(Self { stop, join })
    }

    async fn shutdown(self) {
        self.stop.cancel();
        if let Ok(set) = self.join.await {
            set.shutdown().await;
        }
    }
}

/// Notice handed to observers when the listener skipped `n` bus events.
fn lagged(n: u64) -> Arc<Event> {
    Arc::new(Event::observer_overflow("listener", "lagged", n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tape {
        seen: Mutex<Vec<(EventKind, Option<u32>)>>,
    }

    #[async_trait]
    impl Observe for Tape {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push((event.kind, event.count));
        }

        fn name(&self) -> &'static str {
            "tape"
        }
    }

    #[tokio::test]
    async fn listener_reports_lag_to_observers() {
        let bus = Bus::new(2);
        let tape = Arc::new(Tape::default());
        let observers: Vec<Arc<dyn Observe>> = vec![tape.clone()];
        let listener = ObserverListener::spawn(observers, &bus).unwrap();

        // The listener task has not run yet, so it falls three events behind.
        for _ in 0..3 {
            bus.publish(Event::new(EventKind::MessageBroadcast));
        }
        bus.publish(Event::new(EventKind::SubscriberConnected));
        bus.publish(Event::new(EventKind::HubStopped));
        listener.shutdown().await;

        let seen = tape.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (EventKind::ObserverOverflow, Some(3)),
                (EventKind::SubscriberConnected, None),
                (EventKind::HubStopped, None),
            ]
        );
    }

    #[tokio::test]
    async fn no_observers_means_no_listener() {
        assert!(ObserverListener::spawn(Vec::new(), &Bus::new(4)).is_none());
    }
}

//! # Observer fan-out.
//!
//! Every observer gets its own bounded queue and worker task, so a slow or
//! panicking observer never holds up the hub or the other observers.
//!
//! ```text
//! listener ──emit(Arc<Event>)──┬──► [slot 1] ──► worker ──► LogWriter::on_event
//!                              └──► [slot N] ──► worker ──► custom::on_event
//! ```
//!
//! An event that does not fit a slot is dropped for that observer only. Drops
//! are counted per slot and reported as a single `ObserverOverflow` once the
//! slot accepts again, or when the set shuts down. The count travels back over
//! the bus like any other event.
//!
//! Panics inside `on_event` are caught with `AssertUnwindSafe`. An observer
//! that panics while holding a lock may leave that lock poisoned.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinSet;

use crate::events::{Bus, Event};
use crate::observers::Observe;

struct Slot {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
    lost: u64,
    lost_reason: &'static str,
}

impl Slot {
    fn report_lost(&mut self, bus: &Bus) {
        if self.lost > 0 {
            bus.publish(Event::observer_overflow(self.name, self.lost_reason, self.lost));
            self.lost = 0;
        }
    }
}

/// Per-observer queues plus their worker tasks.
pub struct ObserverSet {
    slots: Vec<Slot>,
    workers: JoinSet<()>,
    bus: Bus,
}

impl ObserverSet {
    /// Spawns one worker per observer. Must run inside a tokio runtime.
    pub fn new(observers: Vec<Arc<dyn Observe>>, bus: Bus) -> Self {
        let mut workers = JoinSet::new();
        let slots = observers
            .into_iter()
            .map(|observer| {
                let capacity = observer.queue_capacity().clamp(1, Semaphore::MAX_PERMITS);
                let (tx, rx) = mpsc::channel(capacity);
                let name = observer.name();
                workers.spawn(drive(observer, rx, bus.clone()));
                Slot {
                    name,
                    tx,
                    lost: 0,
                    lost_reason: "full",
                }
            })
            .collect();

        Self {
            slots,
            workers,
            bus,
        }
    }

    /// Offers `event` to every observer without waiting.
    pub fn emit(&mut self, event: Arc<Event>) {
        for slot in &mut self.slots {
            match slot.tx.try_send(Arc::clone(&event)) {
                Ok(()) => slot.report_lost(&self.bus),
                Err(TrySendError::Full(_)) => {
                    slot.lost += 1;
                    slot.lost_reason = "full";
                }
                Err(TrySendError::Closed(_)) => {
                    slot.lost += 1;
                    slot.lost_reason = "closed";
                }
            }
        }
    }

    /// Reports outstanding drops, closes every queue and waits for the
    /// workers to finish what is already queued.
    pub async fn shutdown(mut self) {
        for slot in &mut self.slots {
            slot.report_lost(&self.bus);
        }
        self.slots.clear();
        while self.workers.join_next().await.is_some() {}
    }
}

async fn drive(observer: Arc<dyn Observe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(event) = rx.recv().await {
        let outcome = AssertUnwindSafe(observer.on_event(&event))
            .catch_unwind()
            .await;
        if let Err(panic) = outcome {
            bus.publish(Event::observer_panicked(observer.name(), describe_panic(&*panic)));
        }
    }
}

fn describe_panic(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&'static str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

//! # Observers of hub events.
//!
//! Provides [`Observe`] (the extension point) and [`ObserverSet`] (the
//! non-blocking fan-out that feeds each observer from its own queue).
//!
//! Observers are **not** hub subscribers: they see observability [`Event`](crate::Event)s
//! (connected, evicted, render failures...), never message payloads.
//!
//! ## Architecture
//! ```text
//! Hub loop ── publish(Event) ──► Bus ──► observer listener ──► ObserverSet::emit
//!                                                               ├──► [queue] ──► LogWriter
//!                                                               └──► [queue] ──► custom ...
//! ```

mod observe;
mod observer_set;

#[cfg(feature = "logging")]
pub mod embedded;

pub use observe::Observe;
pub use observer_set::ObserverSet;

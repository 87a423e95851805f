//! # LogWriter — hub events as `tracing` records
//!
//! ## Levels
//! - `info`: subscriber connected / disconnected, hub started / stopped
//! - `debug`: eviction after a full or closed queue, broadcast fan-out
//! - `warn`: render failures, duplicate registers, observer trouble

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let subscriber = e.subscriber.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::SubscriberConnected => {
                tracing::info!(subscriber, replayed = e.count, "client connected");
            }
            EventKind::SubscriberDisconnected => {
                tracing::info!(subscriber, "client disconnected");
            }
            EventKind::SubscriberEvicted => {
                tracing::debug!(subscriber, reason = e.reason.as_deref(), "client evicted");
            }
            EventKind::DuplicateRegister => {
                tracing::warn!(subscriber, "duplicate register ignored");
            }
            EventKind::MessageBroadcast => {
                tracing::debug!(
                    origin = e.origin.as_deref(),
                    index = e.index,
                    delivered = e.count,
                    "message broadcast"
                );
            }
            EventKind::RenderFailed => {
                tracing::warn!(
                    origin = e.origin.as_deref(),
                    index = e.index,
                    replay_for = e.subscriber.as_deref(),
                    err = e.reason.as_deref(),
                    "render failed"
                );
            }
            EventKind::HubStarted => tracing::info!("hub started"),
            EventKind::ShutdownRequested => {
                tracing::info!(signal = e.reason.as_deref(), "shutdown requested");
            }
            EventKind::HubStopped => {
                tracing::info!(remaining = e.count, "hub stopped");
            }
            EventKind::ObserverPanicked => {
                let info = e.reason.as_deref();
                tracing::warn!(observer = subscriber, info, "observer panicked");
            }
            EventKind::ObserverOverflow => {
                let reason = e.reason.as_deref();
                tracing::warn!(observer = subscriber, reason, lost = e.count, "events lost");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}

//! # Hub configuration.
//!
//! Provides [`HubConfig`], the centralized settings consumed by
//! [`HubBuilder`](crate::HubBuilder).
//!
//! ## Sentinel values
//! Capacities of `0` are clamped to `1`. Queue capacities above
//! `Semaphore::MAX_PERMITS` are capped there, and the bus ring buffer (which is
//! preallocated) is capped at [`MAX_BUS_CAPACITY`]. Use the `*_clamped`
//! accessors rather than reading the fields directly.

use tokio::sync::Semaphore;

/// Upper bound for [`HubConfig::bus_capacity_clamped`].
const MAX_BUS_CAPACITY: usize = 1 << 16;

/// Global configuration for a hub instance.
///
/// ## Field semantics
/// - `intent_capacity`: how many register/unregister/broadcast intents may
///   wait for the loop before awaiting producers are held back
/// - `subscriber_queue_capacity`: live-delivery headroom per subscriber; a
///   subscriber that falls this many payloads behind is evicted
/// - `bus_capacity`: observability event ring buffer size
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Capacity of the intent queue feeding the hub loop.
    ///
    /// When full, awaiting methods on [`HubHandle`](crate::HubHandle) wait and
    /// `try_*` methods return [`HubError::Busy`](crate::HubError::Busy).
    pub intent_capacity: usize,

    /// Per-subscriber queue capacity for live broadcasts.
    ///
    /// Queues created by [`HubHandle::connect`](crate::HubHandle::connect)
    /// additionally get room for the full history replay.
    pub subscriber_queue_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl HubConfig {
    /// Intent queue capacity clamped to `1..=Semaphore::MAX_PERMITS`.
    #[inline]
    pub fn intent_capacity_clamped(&self) -> usize {
        self.intent_capacity.clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Subscriber queue capacity clamped to `1..=Semaphore::MAX_PERMITS`.
    #[inline]
    pub fn subscriber_queue_capacity_clamped(&self) -> usize {
        self.subscriber_queue_capacity.clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Bus capacity clamped to `1..=MAX_BUS_CAPACITY`.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.clamp(1, MAX_BUS_CAPACITY)
    }
}

impl Default for HubConfig {
    /// Default configuration:
    ///
    /// - `intent_capacity = 1024`
    /// - `subscriber_queue_capacity = 256`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            intent_capacity: 1024,
            subscriber_queue_capacity: 256,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacities_are_clamped() {
        let cfg = HubConfig {
            intent_capacity: 0,
            subscriber_queue_capacity: 0,
            bus_capacity: 0,
        };
        assert_eq!(cfg.intent_capacity_clamped(), 1);
        assert_eq!(cfg.subscriber_queue_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn huge_capacities_are_capped() {
        let cfg = HubConfig {
            intent_capacity: usize::MAX,
            subscriber_queue_capacity: usize::MAX,
            bus_capacity: usize::MAX,
        };
        assert_eq!(cfg.intent_capacity_clamped(), Semaphore::MAX_PERMITS);
        assert_eq!(cfg.subscriber_queue_capacity_clamped(), Semaphore::MAX_PERMITS);
        assert_eq!(cfg.bus_capacity_clamped(), MAX_BUS_CAPACITY);
    }
}

use std::sync::Arc;

use crate::observers::Observe;
use crate::render::{PlainText, RenderRef};
use crate::runtime::{Hub, HubConfig};

/// Builder for constructing a [`Hub`].
pub struct HubBuilder {
    cfg: HubConfig,
    renderer: RenderRef,
    observers: Vec<Arc<dyn Observe>>,
}

impl HubBuilder {
    /// Creates a new builder; the renderer defaults to [`PlainText`].
    pub fn new(cfg: HubConfig) -> Self {
        Self {
            cfg,
            renderer: Arc::new(PlainText),
            observers: Vec::new(),
        }
    }

    /// Sets the renderer used for both replay and live broadcast.
    pub fn with_renderer(mut self, renderer: RenderRef) -> Self {
        self.renderer = renderer;
        self
    }

    /// Sets event observers (logging, metrics, ...).
    ///
    /// Each observer gets a dedicated worker with a bounded queue, started
    /// when the hub runs.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Adds the built-in `tracing` [`LogWriter`](crate::LogWriter).
    #[cfg(feature = "logging")]
    pub fn with_logging(mut self) -> Self {
        self.observers
            .push(Arc::new(crate::observers::embedded::LogWriter::new()));
        self
    }

    /// Builds the hub. Nothing is spawned until [`Hub::run`] or [`Hub::spawn`].
    pub fn build(self) -> Hub {
        Hub::from_parts(self.cfg, self.renderer, self.observers)
    }
}

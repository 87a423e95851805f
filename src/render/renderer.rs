use std::sync::Arc;

use crate::error::RenderError;
use crate::messages::Message;
use crate::render::Payload;

/// Shared handle to a renderer.
pub type RenderRef = Arc<dyn Render>;

/// Turns a [`Message`] into a [`Payload`].
///
/// Called from inside the hub loop for both replay and live broadcast, so it
/// must not block or perform I/O.
pub trait Render: Send + Sync + 'static {
    /// Renders one message.
    fn render(&self, message: &Message) -> Result<Payload, RenderError>;

    /// Returns the renderer name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

use std::fmt;
use std::sync::Arc;

/// Shared handle to a message.
pub type MessageRef = Arc<Message>;

/// Immutable chat-style message produced by any source.
///
/// Cloning is cheap: both fields are reference counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    origin_id: Arc<str>,
    text: Arc<str>,
}

impl Message {
    /// Creates a new message.
    pub fn new(origin_id: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            origin_id: origin_id.into(),
            text: text.into(),
        }
    }

    /// Creates the message and returns it as a shared handle.
    pub fn arc(origin_id: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> MessageRef {
        Arc::new(Self::new(origin_id, text))
    }

    /// Id of the producer (connection, bot, system) that sent the message.
    pub fn origin_id(&self) -> &str {
        &self.origin_id
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn origin_arc(&self) -> Arc<str> {
        Arc::clone(&self.origin_id)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin_id, self.text)
    }
}

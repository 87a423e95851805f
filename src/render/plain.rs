use crate::error::RenderError;
use crate::messages::Message;
use crate::render::{Payload, Render};

/// Renders `"{origin_id}: {text}"` as UTF-8. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl Render for PlainText {
    fn render(&self, message: &Message) -> Result<Payload, RenderError> {
        Ok(Payload::from(message.to_string()))
    }

    fn name(&self) -> &str {
        "plain_text"
    }
}

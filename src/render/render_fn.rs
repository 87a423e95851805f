//! # Function-backed renderer (`RenderFn`)
//!
//! [`RenderFn`] wraps a closure `F: Fn(&Message) -> Result<Payload, RenderError>`.
//!
//! ## Example
//! ```rust
//! use fanhub::{Message, Payload, Render, RenderFn, RenderRef};
//!
//! let r: RenderRef = RenderFn::arc("upper", |m: &Message| {
//!     Ok(Payload::from(m.text().to_uppercase()))
//! });
//!
//! let p = r.render(&Message::new("A", "hi")).unwrap();
//! assert_eq!(p.as_str(), Some("HI"));
//! assert_eq!(r.name(), "upper");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::RenderError;
use crate::messages::Message;
use crate::render::{Payload, Render};

/// Function-backed renderer.
#[derive(Debug)]
pub struct RenderFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> RenderFn<F>
where
    F: Fn(&Message) -> Result<Payload, RenderError> + Send + Sync + 'static,
{
    /// Creates a new function-backed renderer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the renderer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Render for RenderFn<F>
where
    F: Fn(&Message) -> Result<Payload, RenderError> + Send + Sync + 'static,
{
    fn render(&self, message: &Message) -> Result<Payload, RenderError> {
        (self.f)(message)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_pass_through() {
        let r = RenderFn::new("picky", |m: &Message| {
            if m.text().is_empty() {
                Err(RenderError::failed("empty"))
            } else {
                Ok(Payload::from(m.text()))
            }
        });
        assert!(r.render(&Message::new("A", "")).is_err());
        assert_eq!(
            r.render(&Message::new("A", "ok")).unwrap().as_str(),
            Some("ok")
        );
    }
}

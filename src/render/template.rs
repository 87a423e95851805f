//! # Handlebars message renderer.
//!
//! [`Template`] holds a [`Handlebars`] registry with a single registered
//! template. Two fields are exposed to it: `origin_id` and `text`.
//!
//! The source is compiled once at construction and checked against a sample
//! message in strict mode, so a syntax error or a reference to an unknown
//! field is reported by [`Template::new`] rather than on every broadcast.
//!
//! ## Escaping
//! Values are inserted raw by default. [`Template::with_html_escape`] switches
//! to the handlebars HTML escaper (`{{{field}}}` still inserts raw).
//!
//! ## Example
//! ```rust
//! use fanhub::{Message, Render, Template};
//!
//! let t = Template::new(r#"<div id="{{ origin_id }}">{{ text }}</div>"#)
//!     .unwrap()
//!     .with_html_escape();
//!
//! let p = t.render(&Message::new("A", "<b>hi</b>")).unwrap();
//! assert_eq!(p.as_str(), Some(r#"<div id="A">&lt;b&gt;hi&lt;/b&gt;</div>"#));
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::RenderError;
use crate::messages::Message;
use crate::render::{Payload, Render};

const NAME: &str = "message";

/// Values visible to the template.
#[derive(Serialize)]
struct Fields<'a> {
    origin_id: &'a str,
    text: &'a str,
}

impl<'a> From<&'a Message> for Fields<'a> {
    fn from(m: &'a Message) -> Self {
        Self {
            origin_id: m.origin_id(),
            text: m.text(),
        }
    }
}

/// Compiled handlebars template over `{{origin_id}}` and `{{text}}`.
#[derive(Clone)]
pub struct Template {
    registry: Arc<Handlebars<'static>>,
    escape_html: bool,
}

impl Template {
    /// Compiles a template source.
    ///
    /// Fails with [`RenderError::Template`] on a syntax error or an unknown field.
    pub fn new(source: &str) -> Result<Self, RenderError> {
        Self::compile(source, false)
    }

    /// Reads and compiles a template file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path)?;
        Self::new(&source)
    }

    /// HTML-escapes substituted values.
    #[must_use]
    pub fn with_html_escape(self) -> Self {
        if self.escape_html {
            return self;
        }
        let mut registry = Handlebars::clone(&self.registry);
        registry.register_escape_fn(handlebars::html_escape);
        Self {
            registry: Arc::new(registry),
            escape_html: true,
        }
    }

    fn compile(source: &str, escape_html: bool) -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        if !escape_html {
            registry.register_escape_fn(handlebars::no_escape);
        }
        registry
            .register_template_string(NAME, source)
            .map_err(|e| RenderError::Template { error: e.to_string() })?;

        let template = Self {
            registry: Arc::new(registry),
            escape_html,
        };
        template.render_str(&Message::new("origin", "text"))?;
        Ok(template)
    }

    fn render_str(&self, message: &Message) -> Result<String, RenderError> {
        self.registry
            .render(NAME, &Fields::from(message))
            .map_err(|e| RenderError::Template { error: e.to_string() })
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("escape_html", &self.escape_html)
            .finish_non_exhaustive()
    }
}

impl Render for Template {
    fn render(&self, message: &Message) -> Result<Payload, RenderError> {
        self.render_str(message).map(Payload::from)
    }

    fn name(&self) -> &str {
        "template"
    }
}

//! Rendering messages into transport payloads.
//!
//! The hub only depends on the [`Render`] capability. A renderer must be pure:
//! the same message rendered twice yields the same payload (or the same kind
//! of failure), and rendering has no side effects.
//!
//! ## Contents
//! - [`Payload`] cheaply clonable rendered bytes
//! - [`Render`] the renderer trait, [`RenderRef`] its shared handle
//! - [`RenderFn`] closure adapter
//! - [`PlainText`] `"origin: text"` renderer (the default)
//! - [`Template`] `{{origin_id}}` / `{{text}}` template renderer

mod payload;
mod plain;
mod render_fn;
mod renderer;
mod template;

pub use payload::Payload;
pub use plain::PlainText;
pub use render_fn::RenderFn;
pub use renderer::{Render, RenderRef};
pub use template::Template;

//! Error types used by the hub runtime and renderers.
//!
//! This module defines two main error enums:
//!
//! - [`HubError`] — errors raised when talking to the hub coordinator.
//! - [`RenderError`] — errors raised while turning a message into a payload.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Queue overflow, duplicate registration and redundant unregistration are
//! **not** errors: the hub handles them as eviction or no-ops and reports them
//! through [`Event`](crate::Event)s only.

use thiserror::Error;

/// # Errors produced when submitting intents to the hub.
///
/// None of these are fatal to the coordinator itself; they describe why a
/// particular caller could not reach it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The hub loop has stopped (cancelled, or every handle was dropped).
    #[error("hub is closed")]
    Closed,

    /// The intent queue is full (only returned by the `try_*` methods).
    #[error("hub intent queue is full")]
    Busy,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanhub::HubError;
    ///
    /// assert_eq!(HubError::Busy.as_label(), "hub_busy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::Closed => "hub_closed",
            HubError::Busy => "hub_busy",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HubError::Closed => "hub loop is no longer accepting intents".to_string(),
            HubError::Busy => "intent queue full; retry or use the awaiting variant".to_string(),
        }
    }
}

/// # Errors produced by a [`Render`](crate::Render) implementation.
///
/// A render failure only affects the single delivery attempt it happened in:
/// the message stays in history and may render fine on a later replay.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template source is malformed or references an unknown field.
    #[error("template error: {error}")]
    Template {
        /// What is wrong with the template.
        error: String,
    },

    /// The renderer rejected this particular message.
    #[error("render failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Loading a template from disk failed.
    #[error("template io: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Shorthand for [`RenderError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        RenderError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanhub::RenderError;
    ///
    /// let err = RenderError::failed("boom");
    /// assert_eq!(err.as_label(), "render_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RenderError::Template { .. } => "render_template",
            RenderError::Failed { .. } => "render_failed",
            RenderError::Io(_) => "render_io",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RenderError::Template { error } => format!("template: {error}"),
            RenderError::Failed { error } => format!("error: {error}"),
            RenderError::Io(e) => format!("io: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(HubError::Closed.as_label(), "hub_closed");
        assert!(HubError::Busy.as_message().contains("full"));
        assert_eq!(
            RenderError::Template { error: "x".into() }.as_label(),
            "render_template"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RenderError = io.into();
        assert_eq!(err.as_label(), "render_io");
        assert!(err.as_message().contains("missing"));
    }
}

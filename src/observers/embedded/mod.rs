//! # Built-in observers
//!
//! - [`LogWriter`]: turns hub events into `tracing` records.

mod log;

pub use log::LogWriter;

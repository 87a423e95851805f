//! Hub runtime: coordinator loop, state machine, and producer handle.
//!
//! The public API from this module is [`Hub`], [`HubHandle`], [`HubBuilder`]
//! and [`HubConfig`].
//!
//! Internal modules:
//! - [`state`]: the subscriber set + history state machine;
//! - [`intent`]: the messages the loop consumes;
//! - [`shutdown`]: OS signal handling for `run_until_shutdown`.

mod builder;
mod config;
mod handle;
mod hub;
mod intent;
mod shutdown;
mod state;

pub use builder::HubBuilder;
pub use config::HubConfig;
pub use handle::HubHandle;
pub use hub::Hub;

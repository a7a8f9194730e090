//! # Dispatcher
//!
//! Command dispatch.
//!
//! Responsibilities:
//! - One-shot `configure` gate (Unconfigured → Configured | Failed)
//! - Command resolution through a `CommandRegistry`
//! - Sync and async failures unified as a namespaced `CommandError`
//! - Every invocation stays pending after a failed configure

pub mod dispatcher;
pub mod error;
pub mod state;

pub use dispatcher::{
    CommandDispatcher, DispatcherBuilder, Invocation, CONFIGURE_COMMAND, LOG_COMMAND,
};
pub use error::{CommandError, DispatcherError};
pub use state::ConfigurationState;

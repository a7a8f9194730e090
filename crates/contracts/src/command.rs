//! Command contracts
//!
//! A command is a callable resolved by name from a `CommandRegistry`.
//! It may complete synchronously (`CommandOutput::Ready`) or hand back a
//! future (`CommandOutput::Pending`); both paths report failures through
//! `ContractError`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::{Config, ContractError};

/// Options passed to a command
pub type Options = Value;

/// Boxed future produced by an asynchronous command
pub type CommandFuture = Pin<Box<dyn Future<Output = Result<Value, ContractError>> + Send>>;

/// Result of invoking a command
pub enum CommandOutput {
    /// Command finished synchronously
    Ready(Value),
    /// Command continues asynchronously
    Pending(CommandFuture),
}

impl CommandOutput {
    pub fn ready(value: Value) -> Self {
        Self::Ready(value)
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ContractError>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Invokable command
///
/// `Err` models a synchronous failure; asynchronous failures surface from the
/// `Pending` future.
pub type Command = Arc<dyn Fn(Options) -> Result<CommandOutput, ContractError> + Send + Sync>;

/// Lookup from command name to implementation
pub trait CommandRegistry: Send + Sync {
    /// Resolve a command by name
    fn get_command(&self, name: &str) -> Option<Command>;

    /// Registered command names (diagnostics only)
    fn command_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Builds the command registry from a validated config
///
/// Called exactly once per dispatcher, from the `configure` path.
pub trait ComponentInitializer: Send + Sync {
    fn initialize(&self, config: Config) -> Result<Arc<dyn CommandRegistry>, ContractError>;
}

impl<F> ComponentInitializer for F
where
    F: Fn(Config) -> Result<Arc<dyn CommandRegistry>, ContractError> + Send + Sync,
{
    fn initialize(&self, config: Config) -> Result<Arc<dyn CommandRegistry>, ContractError> {
        self(config)
    }
}

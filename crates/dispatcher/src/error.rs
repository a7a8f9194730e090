//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Why an invocation failed
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// `configure` called after a successful configure
    #[error("The library has already been configured and may only be configured once.")]
    AlreadyConfigured,

    /// Options rejected while building or validating the config
    #[error(transparent)]
    Configuration(ContractError),

    /// Component initializer failed
    #[error(transparent)]
    Initialization(ContractError),

    /// Command issued before `configure`
    #[error(
        "The library must be configured first. Please do so by calling {namespace}(\"configure\", {{...}})."
    )]
    UnconfiguredCommand { namespace: String },

    /// Registry has no such command
    #[error("The {command} command does not exist.")]
    UnknownCommand { command: String },

    /// Command logic failed, synchronously or from its future
    #[error("{source}")]
    CommandExecution {
        command: String,
        #[source]
        source: ContractError,
    },
}

impl DispatcherError {
    pub fn unconfigured(namespace: impl Into<String>) -> Self {
        Self::UnconfiguredCommand {
            namespace: namespace.into(),
        }
    }

    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    pub fn command_execution(command: impl Into<String>, source: ContractError) -> Self {
        Self::CommandExecution {
            command: command.into(),
            source,
        }
    }

    /// Short label used as a metrics dimension
    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyConfigured => "already_configured",
            Self::Configuration(_) => "configuration",
            Self::Initialization(_) => "initialization",
            Self::UnconfiguredCommand { .. } => "unconfigured",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::CommandExecution { .. } => "command_execution",
        }
    }
}

/// Canonical error surfaced to callers, prefixed with the namespace
#[derive(Debug, Error)]
#[error("[{namespace}] {kind}")]
pub struct CommandError {
    namespace: String,
    kind: DispatcherError,
}

impl CommandError {
    pub fn new(namespace: impl Into<String>, kind: DispatcherError) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kind(&self) -> &DispatcherError {
        &self.kind
    }

    pub fn into_kind(self) -> DispatcherError {
        self.kind
    }
}

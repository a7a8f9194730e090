//! Layered error definitions
//!
//! Categorized by source: config / dom / component / command

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== DOM Errors =====
    /// Node handle does not refer to a live node
    #[error("node {node_id} not found")]
    NodeNotFound { node_id: u64 },

    /// Generic document operation failure
    #[error("dom error: {message}")]
    Dom { message: String },

    // ===== Component Errors =====
    /// Component initialization failure
    #[error("component initialization failed: {message}")]
    Initialization { message: String },

    /// Command received options it cannot use
    #[error("invalid options for '{command}': {message}")]
    InvalidOptions { command: String, message: String },

    /// Command logic failure
    #[error("{message}")]
    Command { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create document error
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }

    /// Create component initialization error
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    /// Create invalid options error
    pub fn invalid_options(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create command failure
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    /// True for errors raised while validating configure options
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ConfigValidation { .. } | Self::ConfigParse { .. })
    }
}

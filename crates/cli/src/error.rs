//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Script file not found
    #[error("Script file not found: {path}")]
    ScriptNotFound { path: String },

    /// Script could not be read or parsed
    #[error("Failed to parse script {path}: {message}")]
    ScriptParse { path: String, message: String },

    /// Options file failed validation
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Some scripted commands were rejected
    #[error("{count} command(s) failed")]
    CommandsFailed { count: u64 },
}

impl CliError {
    pub fn script_not_found(path: impl Into<String>) -> Self {
        Self::ScriptNotFound { path: path.into() }
    }

    pub fn script_parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ScriptParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}

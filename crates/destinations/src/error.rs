//! Destination pipeline error types

use thiserror::Error;

/// Pipeline errors
///
/// `Clone` so memoized futures can hand the same failure to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationError {
    /// Host element lookup or frame creation failed
    #[error("frame provisioning failed: {message}")]
    Provisioning { message: String },

    /// Fire executor could not be derived from the frame
    #[error("fire executor unavailable: {message}")]
    Executor { message: String },

    /// Pipeline constructed outside a Tokio runtime
    #[error("destination pipeline requires a running Tokio runtime")]
    NoRuntime,
}

impl DestinationError {
    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::Provisioning {
            message: message.into(),
        }
    }

    pub fn executor(message: impl Into<String>) -> Self {
        Self::Executor {
            message: message.into(),
        }
    }
}

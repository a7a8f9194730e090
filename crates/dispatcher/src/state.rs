//! Configuration state machine
//!
//! `Unconfigured → Configured` or `Unconfigured → Failed`, once. Both target
//! states are terminal.

use std::fmt;
use std::sync::Arc;

use contracts::CommandRegistry;

/// Configuration state owned by one dispatcher
#[derive(Clone, Default)]
pub enum ConfigurationState {
    #[default]
    Unconfigured,
    /// Holds the registry produced by the initializer
    Configured(Arc<dyn CommandRegistry>),
    /// Poisoned: every later invocation stays pending forever
    Failed,
}

impl ConfigurationState {
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn registry(&self) -> Option<&Arc<dyn CommandRegistry>> {
        match self {
            Self::Configured(registry) => Some(registry),
            _ => None,
        }
    }

    /// Gauge value: 0 unconfigured, 1 configured, 2 failed
    pub fn as_gauge(&self) -> u8 {
        match self {
            Self::Unconfigured => 0,
            Self::Configured(_) => 1,
            Self::Failed => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Configured(_) => "configured",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Debug for ConfigurationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(registry) => f
                .debug_tuple("Configured")
                .field(&registry.command_names())
                .finish(),
            other => f.write_str(match other {
                Self::Unconfigured => "Unconfigured",
                _ => "Failed",
            }),
        }
    }
}

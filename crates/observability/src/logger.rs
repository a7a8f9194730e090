//! SDK logger gated by an injectable enable flag
//!
//! `LogController` is shared between the dispatcher (which toggles it via the
//! `log` command and the query-string override) and every `Logger` handed to
//! components. Nothing here is process-global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

/// Shared logging-enabled flag, initially disabled
#[derive(Debug, Clone, Default)]
pub struct LogController {
    enabled: Arc<AtomicBool>,
}

impl LogController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

/// Namespaced logger
#[derive(Debug, Clone)]
pub struct Logger {
    namespace: Arc<str>,
    controller: LogController,
}

impl Logger {
    pub fn new(namespace: &str, controller: LogController) -> Self {
        Self {
            namespace: Arc::from(namespace),
            controller,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn controller(&self) -> &LogController {
        &self.controller
    }

    pub fn enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    /// Log a message with structured details; no-op while disabled
    pub fn log(&self, message: &str, details: &Value) {
        if self.enabled() {
            info!(namespace = %self.namespace, details = %details, "{message}");
        }
    }

    /// Log a warning; no-op while disabled
    pub fn warn(&self, message: &str, details: &Value) {
        if self.enabled() {
            warn!(namespace = %self.namespace, details = %details, "{message}");
        }
    }
}

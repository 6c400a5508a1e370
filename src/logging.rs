//! Severity-channel logging consumed by the server core.
//!
//! The core never talks to a logging backend directly; it goes through the
//! [`Logger`] trait so the transport can be swapped (or silenced in tests).
//! The production implementation forwards to `tracing`.

use std::sync::Arc;

/// Three-channel logger. Implementations must be callable from any
/// executor thread; cross-thread ordering is best-effort.
pub trait Logger: Send + Sync {
    fn message(&self, s: &str);
    fn warning(&self, s: &str);
    fn error(&self, s: &str);
}

/// Per-channel enable switches.
#[derive(Debug, Clone, Copy)]
pub struct LogFilter {
    pub messages: bool,
    pub warnings: bool,
    pub errors: bool,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            messages: true,
            warnings: true,
            errors: true,
        }
    }
}

/// [`Logger`] backed by the `tracing` macros.
#[derive(Debug, Default, Clone)]
pub struct TracingLogger {
    filter: LogFilter,
}

impl TracingLogger {
    pub fn new(filter: LogFilter) -> Self {
        Self { filter }
    }

    pub fn shared() -> Arc<dyn Logger> {
        Arc::new(Self::default())
    }
}

impl Logger for TracingLogger {
    fn message(&self, s: &str) {
        if self.filter.messages {
            tracing::info!("{s}");
        }
    }

    fn warning(&self, s: &str) {
        if self.filter.warnings {
            tracing::warn!("{s}");
        }
    }

    fn error(&self, s: &str) {
        if self.filter.errors {
            tracing::error!("{s}");
        }
    }
}

//! Operation log adapter forwarding records to `tracing`.

use crate::federation::ports::{OperationLog, Severity};

/// Operation log that emits each record as a `tracing` event at the
/// matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOperationLog;

impl TracingOperationLog {
    /// Creates the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OperationLog for TracingOperationLog {
    fn record(&self, category: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(category, "{message}"),
            Severity::Warning => tracing::warn!(category, "{message}"),
            Severity::Error => tracing::error!(category, "{message}"),
        }
    }
}

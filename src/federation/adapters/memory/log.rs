//! Recording operation log for tests.

use std::sync::{Arc, RwLock};

use crate::federation::ports::{OperationLog, Severity};

/// One record captured by [`MemoryOperationLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Category the record was filed under.
    pub category: String,
    /// Human-readable condition description.
    pub message: String,
    /// Record severity.
    pub severity: Severity,
}

/// Thread-safe operation log that retains every record for assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryOperationLog {
    records: Arc<RwLock<Vec<LogRecord>>>,
}

impl MemoryOperationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the records captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl OperationLog for MemoryOperationLog {
    fn record(&self, category: &str, message: &str, severity: Severity) {
        if let Ok(mut records) = self.records.write() {
            records.push(LogRecord {
                category: category.to_owned(),
                message: message.to_owned(),
                severity,
            });
        }
    }
}

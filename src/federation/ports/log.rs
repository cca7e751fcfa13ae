//! Operation log sink for degraded and failed dispatch outcomes.

use std::fmt;

/// Severity attached to an operation log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Expected absence, e.g. a lookup that found nothing.
    Info,
    /// A degraded path was taken, e.g. hide instead of delete.
    Warning,
    /// A backend could not be resolved or reported failure.
    Error,
}

impl Severity {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink invoked on backend-not-found, unsupported-operation, and not-found
/// conditions; never on success paths.
pub trait OperationLog: Send + Sync {
    /// Records one condition under a subsystem category (e.g.
    /// `"dispatcher"`).
    fn record(&self, category: &str, message: &str, severity: Severity);
}

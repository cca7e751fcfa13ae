//! Capability negotiation between the dispatcher and backends.

use crate::federation::domain::OperationKind;
use crate::federation::ports::CalendarBackend;

/// Outcome of negotiating an operation against a backend's advertised
/// capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// The backend implements the operation natively; delegate to it.
    Delegate,
    /// The backend lacks native support but the operation has a designed
    /// fallback the federation layer performs itself.
    Emulate,
    /// The backend lacks native support and no fallback exists.
    Unsupported,
}

impl Negotiation {
    /// Negotiates the given operation against a backend.
    ///
    /// The dispatcher consults this before every mutating call and before
    /// the period-bounded listing optimisation; it never guesses.
    #[must_use]
    pub fn for_operation(backend: &dyn CalendarBackend, operation: OperationKind) -> Self {
        if backend.supports(operation) {
            Self::Delegate
        } else if operation.has_emulation() {
            Self::Emulate
        } else {
            Self::Unsupported
        }
    }
}

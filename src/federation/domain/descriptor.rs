//! Backend descriptor registered ahead of activation.

use super::CalendarDomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A backend registration that has not been constructed yet.
///
/// Descriptors pair a factory name with the ordered constructor arguments
/// to pass at setup time. They are immutable once stored; several
/// descriptors may share a name, in which case the last registration wins
/// when [`setup_all`](crate::federation::services::BackendRegistry::setup_all)
/// runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    name: String,
    args: Vec<Value>,
}

impl BackendDescriptor {
    /// Creates a descriptor with no constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::EmptyDescriptorName`] when the name
    /// is empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, CalendarDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CalendarDomainError::EmptyDescriptorName);
        }

        Ok(Self {
            name: trimmed.to_owned(),
            args: Vec::new(),
        })
    }

    /// Sets the ordered constructor arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Returns the factory name this descriptor references.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered constructor arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

//! Validated user identifier type.

use super::CalendarDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated, non-empty user identifier.
///
/// User identifiers are opaque to the federation layer; they are passed
/// through to backends for visibility and writability checks. Case is
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::EmptyUserId`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CalendarDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CalendarDomainError::EmptyUserId);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the user identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Validated canonical backend name type.

use super::CalendarDomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Validated, lowercase alphanumeric-plus-underscores backend identifier.
///
/// Canonical names key the activated-backend table and form the first
/// segment of every composite identifier (e.g. `inmemorybackend`,
/// `caldav_backend`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendName(String);

impl BackendName {
    /// Creates a validated backend name.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::EmptyBackendName`] when the value is
    /// empty after trimming, or [`CalendarDomainError::InvalidBackendName`]
    /// when it contains characters outside `[a-z0-9_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, CalendarDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(CalendarDomainError::EmptyBackendName);
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if !is_valid {
            return Err(CalendarDomainError::InvalidBackendName(raw));
        }

        Ok(Self(normalized))
    }

    /// Derives the canonical name for a backend implementation from its
    /// concrete type path.
    ///
    /// Generic arguments are stripped and only the last `::` path component
    /// is kept, case-folded to lowercase. Two differently-configured
    /// instances of one backend type therefore share a canonical name and
    /// collide in the activated-backend table; only one can be active at a
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::EmptyBackendName`] or
    /// [`CalendarDomainError::InvalidBackendName`] when the path does not
    /// reduce to a usable name.
    pub fn from_type_path(path: &str) -> Result<Self, CalendarDomainError> {
        let base = path.split('<').next().unwrap_or(path);
        let last = base.rsplit("::").next().unwrap_or(base);
        Self::new(last)
    }

    /// Returns the backend name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BackendName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for BackendName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

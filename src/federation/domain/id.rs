//! Composite identifier codec for federated calendar addressing.
//!
//! Identifiers are the only wire-visible contract of the federation layer:
//! two dot-delimited segments address a calendar (`backend.calendar`),
//! three address one object inside it (`backend.calendar.object`).
//! Segments are case-sensitive, non-empty, and never contain the
//! delimiter.

use super::IdentifierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delimiter joining composite identifier segments.
pub const SEGMENT_DELIMITER: char = '.';

fn validate_segment(segment: &str) -> Result<(), IdentifierError> {
    if segment.is_empty() || segment.contains(SEGMENT_DELIMITER) {
        return Err(IdentifierError::InvalidSegment(segment.to_owned()));
    }
    Ok(())
}

/// Composite identifier of a federated calendar: `backend.calendar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarId {
    backend: String,
    calendar: String,
}

impl CalendarId {
    /// Builds a calendar identifier from its two segments.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSegment`] when a segment is empty
    /// or contains the delimiter; supplying such a segment is a caller
    /// error, distinct from decoding a malformed identifier.
    pub fn new(
        backend: impl Into<String>,
        calendar: impl Into<String>,
    ) -> Result<Self, IdentifierError> {
        let backend_segment = backend.into();
        let calendar_segment = calendar.into();
        validate_segment(&backend_segment)?;
        validate_segment(&calendar_segment)?;
        Ok(Self {
            backend: backend_segment,
            calendar: calendar_segment,
        })
    }

    /// Decodes a calendar identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Malformed`] unless the input splits into
    /// exactly two non-empty segments; nothing is silently truncated.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let segments: Vec<&str> = input.split(SEGMENT_DELIMITER).collect();
        match segments.as_slice() {
            [backend, calendar] if !backend.is_empty() && !calendar.is_empty() => Ok(Self {
                backend: (*backend).to_owned(),
                calendar: (*calendar).to_owned(),
            }),
            _ => Err(IdentifierError::Malformed(input.to_owned())),
        }
    }

    /// Returns the backend segment.
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Returns the backend-local calendar segment.
    #[must_use]
    pub fn calendar(&self) -> &str {
        &self.calendar
    }

    /// Derives the identifier of an object inside this calendar.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSegment`] when the UID is empty or
    /// contains the delimiter.
    pub fn object(&self, uid: impl Into<String>) -> Result<ObjectId, IdentifierError> {
        ObjectId::new(self.clone(), uid)
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEGMENT_DELIMITER}{}", self.backend, self.calendar)
    }
}

impl FromStr for CalendarId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CalendarId> for String {
    fn from(id: CalendarId) -> Self {
        id.to_string()
    }
}

/// Composite identifier of a federated calendar object:
/// `backend.calendar.object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId {
    calendar: CalendarId,
    uid: String,
}

impl ObjectId {
    /// Builds an object identifier from a calendar identifier and a UID.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSegment`] when the UID is empty or
    /// contains the delimiter.
    pub fn new(calendar: CalendarId, uid: impl Into<String>) -> Result<Self, IdentifierError> {
        let uid_segment = uid.into();
        validate_segment(&uid_segment)?;
        Ok(Self {
            calendar,
            uid: uid_segment,
        })
    }

    /// Decodes an object identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Malformed`] unless the input splits into
    /// exactly three non-empty segments.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let segments: Vec<&str> = input.split(SEGMENT_DELIMITER).collect();
        match segments.as_slice() {
            [backend, calendar, uid]
                if !backend.is_empty() && !calendar.is_empty() && !uid.is_empty() =>
            {
                Ok(Self {
                    calendar: CalendarId {
                        backend: (*backend).to_owned(),
                        calendar: (*calendar).to_owned(),
                    },
                    uid: (*uid).to_owned(),
                })
            }
            _ => Err(IdentifierError::Malformed(input.to_owned())),
        }
    }

    /// Returns the backend segment.
    #[must_use]
    pub fn backend(&self) -> &str {
        self.calendar.backend()
    }

    /// Returns the backend-local calendar segment.
    #[must_use]
    pub fn calendar(&self) -> &str {
        self.calendar.calendar()
    }

    /// Returns the identifier of the containing calendar.
    #[must_use]
    pub const fn calendar_id(&self) -> &CalendarId {
        &self.calendar
    }

    /// Returns the object UID segment.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEGMENT_DELIMITER}{}", self.calendar, self.uid)
    }
}

impl FromStr for ObjectId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_string()
    }
}

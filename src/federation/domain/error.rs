//! Error types for federation domain validation and identifier parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while encoding or decoding composite identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// The input does not split into exactly two or three non-empty
    /// delimiter-separated segments.
    #[error("malformed composite identifier: '{0}'")]
    Malformed(String),

    /// A caller-supplied segment is empty or contains the segment
    /// delimiter.
    #[error("invalid identifier segment: '{0}'")]
    InvalidSegment(String),
}

/// Errors returned while constructing federation domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarDomainError {
    /// The backend name is empty after trimming.
    #[error("backend name must not be empty")]
    EmptyBackendName,

    /// The backend name contains characters outside `[a-z0-9_]`.
    #[error(
        "backend name '{0}' contains invalid characters (only lowercase alphanumeric and underscores allowed)"
    )]
    InvalidBackendName(String),

    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The calendar URI is empty after trimming.
    #[error("calendar uri must not be empty")]
    EmptyCalendarUri,

    /// The object UID is empty after trimming.
    #[error("object uid must not be empty")]
    EmptyObjectUid,

    /// The backend descriptor name is empty after trimming.
    #[error("backend descriptor name must not be empty")]
    EmptyDescriptorName,

    /// The period end precedes its start.
    #[error("time period end {end} precedes start {start}")]
    InvalidPeriod {
        /// Requested period start.
        start: DateTime<Utc>,
        /// Requested period end.
        end: DateTime<Utc>,
    },
}

/// Error returned while parsing an operation kind from its string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown operation kind: {0}")]
pub struct ParseOperationKindError(pub String);

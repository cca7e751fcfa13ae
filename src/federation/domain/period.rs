//! Inclusive time period used for bounded object listings.

use super::CalendarDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed time interval `[start, end]`.
///
/// Both endpoints are inclusive; a period whose start equals its end covers
/// that single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimePeriod {
    /// Creates a validated time period.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::InvalidPeriod`] when `end` precedes
    /// `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CalendarDomainError> {
        if end < start {
            return Err(CalendarDomainError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the inclusive start of the period.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive end of the period.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Reports whether two periods share at least one instant.
    ///
    /// Intersection is inclusive on both bounds: a period ending exactly
    /// when another starts intersects it.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

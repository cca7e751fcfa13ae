//! Operation kinds negotiated between the dispatcher and backends.

use super::ParseOperationKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation a backend may or may not implement natively.
///
/// Backends advertise support per kind through
/// [`CalendarBackend::supports`](crate::federation::ports::CalendarBackend::supports);
/// the dispatcher consults that advertisement before every mutating call
/// and before the period-bounded listing optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Create a calendar.
    CreateCalendar,
    /// Edit a calendar's data.
    EditCalendar,
    /// Delete a calendar.
    DeleteCalendar,
    /// Bump a calendar's change marker.
    TouchCalendar,
    /// Merge one calendar into another within the same backend.
    MergeCalendars,
    /// Create an object inside a calendar.
    CreateObject,
    /// Edit an object's data.
    EditObject,
    /// Delete an object.
    DeleteObject,
    /// Move an object between calendars of the same backend.
    MoveObject,
    /// List only the objects falling inside a time period.
    ObjectsInPeriod,
}

impl OperationKind {
    /// Every operation kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::CreateCalendar,
        Self::EditCalendar,
        Self::DeleteCalendar,
        Self::TouchCalendar,
        Self::MergeCalendars,
        Self::CreateObject,
        Self::EditObject,
        Self::DeleteObject,
        Self::MoveObject,
        Self::ObjectsInPeriod,
    ];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateCalendar => "create_calendar",
            Self::EditCalendar => "edit_calendar",
            Self::DeleteCalendar => "delete_calendar",
            Self::TouchCalendar => "touch_calendar",
            Self::MergeCalendars => "merge_calendars",
            Self::CreateObject => "create_object",
            Self::EditObject => "edit_object",
            Self::DeleteObject => "delete_object",
            Self::MoveObject => "move_object",
            Self::ObjectsInPeriod => "objects_in_period",
        }
    }

    /// Reports whether the federation layer has a designed fallback for
    /// this operation when a backend lacks native support.
    ///
    /// Deletes degrade to hiding, period listings to local filtering, and
    /// merge/move to object-by-object decomposition. Create, edit, and
    /// touch have no fallback.
    #[must_use]
    pub const fn has_emulation(self) -> bool {
        matches!(
            self,
            Self::DeleteCalendar
                | Self::DeleteObject
                | Self::MergeCalendars
                | Self::MoveObject
                | Self::ObjectsInPeriod
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OperationKind {
    type Error = ParseOperationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "create_calendar" => Ok(Self::CreateCalendar),
            "edit_calendar" => Ok(Self::EditCalendar),
            "delete_calendar" => Ok(Self::DeleteCalendar),
            "touch_calendar" => Ok(Self::TouchCalendar),
            "merge_calendars" => Ok(Self::MergeCalendars),
            "create_object" => Ok(Self::CreateObject),
            "edit_object" => Ok(Self::EditObject),
            "delete_object" => Ok(Self::DeleteObject),
            "move_object" => Ok(Self::MoveObject),
            "objects_in_period" => Ok(Self::ObjectsInPeriod),
            _ => Err(ParseOperationKindError(value.to_owned())),
        }
    }
}

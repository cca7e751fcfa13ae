//! Backend port: the capability surface a storage backend exposes to the
//! federation layer.

use crate::federation::domain::{
    Calendar, CalendarData, CalendarObject, ObjectData, OperationKind, TimePeriod, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage backend contract.
///
/// All URIs and UIDs are backend-local; composite identifiers never cross
/// this boundary. Mutating operations and the period-bounded listing are
/// capability-gated: the dispatcher checks [`Self::supports`] before
/// calling them, and implementations are expected to answer
/// [`BackendError::Unsupported`] if called anyway.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Returns the implementation's concrete type path, from which the
    /// registry derives the canonical activation name.
    ///
    /// Implementations should return [`std::any::type_name`] for `Self`.
    fn type_path(&self) -> &'static str;

    /// Reports whether the backend natively implements the operation.
    fn supports(&self, operation: OperationKind) -> bool;

    /// Returns the calendars visible to the given user, in the backend's
    /// own order.
    async fn calendars(&self, user: &UserId) -> BackendResult<Vec<Calendar>>;

    /// Finds a calendar by backend-local URI.
    ///
    /// Returns `None` when the calendar does not exist; absence is not a
    /// fault.
    async fn find_calendar(&self, uri: &str) -> BackendResult<Option<Calendar>>;

    /// Reports whether the user may write to the calendar.
    async fn is_calendar_writable(&self, uri: &str, user: &UserId) -> BackendResult<bool>;

    /// Creates a calendar.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unsupported`] without the
    /// [`OperationKind::CreateCalendar`] capability.
    async fn create_calendar(&self, data: &CalendarData) -> BackendResult<Calendar>;

    /// Edits a calendar in place and returns its new state.
    async fn edit_calendar(&self, uri: &str, data: &CalendarData) -> BackendResult<Calendar>;

    /// Deletes a calendar and everything in it.
    async fn delete_calendar(&self, uri: &str) -> BackendResult<()>;

    /// Bumps the calendar's change marker.
    async fn touch_calendar(&self, uri: &str) -> BackendResult<()>;

    /// Merges every object of `source_uri` into `destination_uri` and
    /// removes the source calendar.
    async fn merge_calendars(&self, destination_uri: &str, source_uri: &str) -> BackendResult<()>;

    /// Returns every object in the calendar, in the backend's own order.
    async fn objects(&self, uri: &str) -> BackendResult<Vec<CalendarObject>>;

    /// Returns the objects whose time bounds intersect the period.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unsupported`] without the
    /// [`OperationKind::ObjectsInPeriod`] capability; the dispatcher then
    /// filters an unbounded listing itself.
    async fn objects_in_period(
        &self,
        uri: &str,
        period: &TimePeriod,
    ) -> BackendResult<Vec<CalendarObject>>;

    /// Finds an object by UID within a calendar.
    ///
    /// Returns `None` when the object does not exist; absence is not a
    /// fault.
    async fn find_object(&self, uri: &str, uid: &str) -> BackendResult<Option<CalendarObject>>;

    /// Creates an object inside the calendar.
    async fn create_object(&self, uri: &str, data: &ObjectData) -> BackendResult<CalendarObject>;

    /// Edits an object in place and returns its new state.
    async fn edit_object(
        &self,
        uri: &str,
        uid: &str,
        data: &ObjectData,
    ) -> BackendResult<CalendarObject>;

    /// Deletes an object.
    async fn delete_object(&self, uri: &str, uid: &str) -> BackendResult<()>;

    /// Moves an object between two calendars of this backend.
    async fn move_object(
        &self,
        source_uri: &str,
        uid: &str,
        destination_uri: &str,
    ) -> BackendResult<()>;
}

/// Errors returned by backend implementations.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend does not implement the requested operation.
    #[error("operation {0} is not supported by this backend")]
    Unsupported(OperationKind),

    /// The backend attempted the operation and reported failure.
    #[error("backend operation failed: {0}")]
    Operation(Arc<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wraps an underlying backend failure.
    pub fn operation(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Operation(Arc::new(err))
    }

    /// Builds an operation failure from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Operation(Arc::new(std::io::Error::other(message.into())))
    }
}

//! Cache gate consulted before trusting a previously resolved calendar.

use crate::federation::domain::{Calendar, CalendarId};
use async_trait::async_trait;

/// Staleness-checked calendar cache.
///
/// The dispatcher consults the gate at the start of
/// [`get_calendar`](crate::federation::services::CalendarFederationService::get_calendar)
/// and returns a cached entry only when it is present and not stale. The
/// gate is advisory: it has no error channel, and a failing implementation
/// should answer absence and staleness rather than fail the operation.
#[async_trait]
pub trait CacheGate: Send + Sync {
    /// Returns the cached calendar for the identifier, if any.
    async fn lookup(&self, id: &CalendarId) -> Option<Calendar>;

    /// Reports whether the cached entry for the identifier can no longer
    /// be trusted. An absent entry is stale by definition.
    async fn is_stale(&self, id: &CalendarId) -> bool;

    /// Records a freshly resolved calendar. Implementations that do not
    /// retain entries ignore this.
    async fn store(&self, id: &CalendarId, calendar: &Calendar);
}

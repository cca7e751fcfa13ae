//! In-memory cache gate adapters.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::federation::domain::{Calendar, CalendarId};
use crate::federation::ports::CacheGate;

/// Cache gate that never holds an entry.
///
/// Every lookup is absent and every entry stale, so the dispatcher always
/// resolves through the backend. This is the default gate for hosts that
/// do not cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCacheGate;

impl NullCacheGate {
    /// Creates the null gate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheGate for NullCacheGate {
    async fn lookup(&self, _id: &CalendarId) -> Option<Calendar> {
        None
    }

    async fn is_stale(&self, _id: &CalendarId) -> bool {
        true
    }

    async fn store(&self, _id: &CalendarId, _calendar: &Calendar) {}
}

#[derive(Debug, Clone)]
struct CachedCalendar {
    stored_at: DateTime<Utc>,
    calendar: Calendar,
}

/// Cache gate holding entries for a fixed time-to-live.
///
/// Staleness is judged against the injected clock, keeping tests
/// deterministic. The gate is advisory: a poisoned lock degrades to
/// absence rather than failing the operation.
#[derive(Clone)]
pub struct TtlCacheGate<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
    ttl: Duration,
    state: Arc<RwLock<HashMap<String, CachedCalendar>>>,
}

impl<C> TtlCacheGate<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a gate whose entries expire after `ttl`.
    #[must_use]
    pub fn new(clock: Arc<C>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<C> CacheGate for TtlCacheGate<C>
where
    C: Clock + Send + Sync,
{
    async fn lookup(&self, id: &CalendarId) -> Option<Calendar> {
        let state = self.state.read().ok()?;
        state.get(&id.to_string()).map(|entry| entry.calendar.clone())
    }

    async fn is_stale(&self, id: &CalendarId) -> bool {
        let Ok(state) = self.state.read() else {
            return true;
        };
        state.get(&id.to_string()).is_none_or(|entry| {
            self.clock.utc().signed_duration_since(entry.stored_at) > self.ttl
        })
    }

    async fn store(&self, id: &CalendarId, calendar: &Calendar) {
        if let Ok(mut state) = self.state.write() {
            state.insert(
                id.to_string(),
                CachedCalendar {
                    stored_at: self.clock.utc(),
                    calendar: calendar.clone(),
                },
            );
        }
    }
}

//! In-memory calendar backend.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::federation::domain::{
    Calendar, CalendarData, CalendarObject, ObjectData, OperationKind, TimePeriod, UserId,
};
use crate::federation::ports::{BackendError, BackendResult, CalendarBackend};

/// Property marking a calendar as visible to users other than its owner.
const SHARED_PROPERTY: &str = "shared";

/// Property bumped by `touch_calendar`.
const SEQUENCE_PROPERTY: &str = "sequence";

/// Thread-safe in-memory calendar backend.
///
/// This is the default backend constructed by argument-less activation and
/// the workhorse of the test suite. The capability set is fixed at
/// construction so tests can exercise both native delegation and the
/// dispatcher's emulation paths against the same storage semantics.
///
/// Visibility: a user sees calendars they own plus calendars carrying a
/// truthy `shared` property; only the owner may write.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    capabilities: Arc<HashSet<OperationKind>>,
    state: Arc<RwLock<InMemoryBackendState>>,
}

#[derive(Debug, Default)]
struct InMemoryBackendState {
    calendars: BTreeMap<String, Calendar>,
    objects: BTreeMap<String, BTreeMap<String, CalendarObject>>,
}

impl InMemoryBackend {
    /// Creates a backend advertising every capability.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(OperationKind::ALL)
    }

    /// Creates a backend advertising only the given capabilities.
    #[must_use]
    pub fn with_capabilities(capabilities: impl IntoIterator<Item = OperationKind>) -> Self {
        Self {
            capabilities: Arc::new(capabilities.into_iter().collect()),
            state: Arc::new(RwLock::new(InMemoryBackendState::default())),
        }
    }

    /// Inserts a calendar directly, bypassing the capability gate.
    ///
    /// Intended for seeding fixtures and restricted backends that cannot
    /// be populated through the port.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Operation`] when the state lock is
    /// poisoned.
    pub fn seed_calendar(&self, calendar: Calendar) -> BackendResult<()> {
        let mut state = self.write_state()?;
        let uri = calendar.uri().to_owned();
        state.objects.entry(uri.clone()).or_default();
        state.calendars.insert(uri, calendar);
        Ok(())
    }

    /// Inserts an object directly, bypassing the capability gate.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Operation`] when the calendar does not
    /// exist or the state lock is poisoned.
    pub fn seed_object(&self, uri: &str, object: CalendarObject) -> BackendResult<()> {
        let mut state = self.write_state()?;
        let entries = state
            .objects
            .get_mut(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        entries.insert(object.uid().to_owned(), object);
        Ok(())
    }

    fn ensure(&self, operation: OperationKind) -> BackendResult<()> {
        if self.capabilities.contains(&operation) {
            return Ok(());
        }
        Err(BackendError::Unsupported(operation))
    }

    fn read_state(&self) -> BackendResult<RwLockReadGuard<'_, InMemoryBackendState>> {
        self.state
            .read()
            .map_err(|err| BackendError::message(err.to_string()))
    }

    fn write_state(&self) -> BackendResult<RwLockWriteGuard<'_, InMemoryBackendState>> {
        self.state
            .write()
            .map_err(|err| BackendError::message(err.to_string()))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn calendar_not_found(uri: &str) -> BackendError {
    BackendError::message(format!("calendar '{uri}' not found"))
}

fn is_shared(calendar: &Calendar) -> bool {
    calendar
        .property(SHARED_PROPERTY)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[async_trait]
impl CalendarBackend for InMemoryBackend {
    fn type_path(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn supports(&self, operation: OperationKind) -> bool {
        self.capabilities.contains(&operation)
    }

    async fn calendars(&self, user: &UserId) -> BackendResult<Vec<Calendar>> {
        let state = self.read_state()?;
        let visible = state
            .calendars
            .values()
            .filter(|calendar| calendar.owner() == user || is_shared(calendar))
            .cloned()
            .collect();
        Ok(visible)
    }

    async fn find_calendar(&self, uri: &str) -> BackendResult<Option<Calendar>> {
        let state = self.read_state()?;
        Ok(state.calendars.get(uri).cloned())
    }

    async fn is_calendar_writable(&self, uri: &str, user: &UserId) -> BackendResult<bool> {
        let state = self.read_state()?;
        let calendar = state
            .calendars
            .get(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        Ok(calendar.owner() == user)
    }

    async fn create_calendar(&self, data: &CalendarData) -> BackendResult<Calendar> {
        self.ensure(OperationKind::CreateCalendar)?;
        let owner = data
            .owner()
            .cloned()
            .ok_or_else(|| BackendError::message("calendar owner is required"))?;
        let uri = data
            .uri()
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

        let mut state = self.write_state()?;
        if state.calendars.contains_key(&uri) {
            return Err(BackendError::message(format!(
                "calendar '{uri}' already exists"
            )));
        }

        let mut calendar = Calendar::new(uri, owner).map_err(BackendError::operation)?;
        calendar.apply(data);
        state.objects.insert(calendar.uri().to_owned(), BTreeMap::new());
        state
            .calendars
            .insert(calendar.uri().to_owned(), calendar.clone());
        Ok(calendar)
    }

    async fn edit_calendar(&self, uri: &str, data: &CalendarData) -> BackendResult<Calendar> {
        self.ensure(OperationKind::EditCalendar)?;
        let mut state = self.write_state()?;
        let calendar = state
            .calendars
            .get_mut(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        calendar.apply(data);
        Ok(calendar.clone())
    }

    async fn delete_calendar(&self, uri: &str) -> BackendResult<()> {
        self.ensure(OperationKind::DeleteCalendar)?;
        let mut state = self.write_state()?;
        state
            .calendars
            .remove(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        state.objects.remove(uri);
        Ok(())
    }

    async fn touch_calendar(&self, uri: &str) -> BackendResult<()> {
        self.ensure(OperationKind::TouchCalendar)?;
        let mut state = self.write_state()?;
        let calendar = state
            .calendars
            .get_mut(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        let sequence = calendar
            .property(SEQUENCE_PROPERTY)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        calendar.apply(
            &CalendarData::new().with_property(SEQUENCE_PROPERTY, Value::from(sequence + 1)),
        );
        Ok(())
    }

    async fn merge_calendars(&self, destination_uri: &str, source_uri: &str) -> BackendResult<()> {
        self.ensure(OperationKind::MergeCalendars)?;
        let mut state = self.write_state()?;
        if !state.calendars.contains_key(destination_uri) {
            return Err(calendar_not_found(destination_uri));
        }
        let moved = state
            .objects
            .remove(source_uri)
            .ok_or_else(|| calendar_not_found(source_uri))?;
        state.calendars.remove(source_uri);
        let destination = state
            .objects
            .entry(destination_uri.to_owned())
            .or_default();
        destination.extend(moved);
        Ok(())
    }

    async fn objects(&self, uri: &str) -> BackendResult<Vec<CalendarObject>> {
        let state = self.read_state()?;
        let entries = state
            .objects
            .get(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        Ok(entries.values().cloned().collect())
    }

    async fn objects_in_period(
        &self,
        uri: &str,
        period: &TimePeriod,
    ) -> BackendResult<Vec<CalendarObject>> {
        self.ensure(OperationKind::ObjectsInPeriod)?;
        let state = self.read_state()?;
        let entries = state
            .objects
            .get(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        let bounded = entries
            .values()
            .filter(|object| {
                object
                    .period()
                    .is_some_and(|bounds| bounds.intersects(period))
            })
            .cloned()
            .collect();
        Ok(bounded)
    }

    async fn find_object(&self, uri: &str, uid: &str) -> BackendResult<Option<CalendarObject>> {
        let state = self.read_state()?;
        let entries = state
            .objects
            .get(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        Ok(entries.get(uid).cloned())
    }

    async fn create_object(&self, uri: &str, data: &ObjectData) -> BackendResult<CalendarObject> {
        self.ensure(OperationKind::CreateObject)?;
        let uid = data
            .uid()
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

        let mut state = self.write_state()?;
        let entries = state
            .objects
            .get_mut(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        if entries.contains_key(&uid) {
            return Err(BackendError::message(format!(
                "object '{uid}' already exists in calendar '{uri}'"
            )));
        }

        let mut object = CalendarObject::new(uid).map_err(BackendError::operation)?;
        object.apply(data);
        entries.insert(object.uid().to_owned(), object.clone());
        Ok(object)
    }

    async fn edit_object(
        &self,
        uri: &str,
        uid: &str,
        data: &ObjectData,
    ) -> BackendResult<CalendarObject> {
        self.ensure(OperationKind::EditObject)?;
        let mut state = self.write_state()?;
        let entries = state
            .objects
            .get_mut(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        let object = entries.get_mut(uid).ok_or_else(|| {
            BackendError::message(format!("object '{uid}' not found in calendar '{uri}'"))
        })?;
        object.apply(data);
        Ok(object.clone())
    }

    async fn delete_object(&self, uri: &str, uid: &str) -> BackendResult<()> {
        self.ensure(OperationKind::DeleteObject)?;
        let mut state = self.write_state()?;
        let entries = state
            .objects
            .get_mut(uri)
            .ok_or_else(|| calendar_not_found(uri))?;
        entries.remove(uid).ok_or_else(|| {
            BackendError::message(format!("object '{uid}' not found in calendar '{uri}'"))
        })?;
        Ok(())
    }

    async fn move_object(
        &self,
        source_uri: &str,
        uid: &str,
        destination_uri: &str,
    ) -> BackendResult<()> {
        self.ensure(OperationKind::MoveObject)?;
        let mut state = self.write_state()?;
        if !state.objects.contains_key(destination_uri) {
            return Err(calendar_not_found(destination_uri));
        }
        let source = state
            .objects
            .get_mut(source_uri)
            .ok_or_else(|| calendar_not_found(source_uri))?;
        let object = source.remove(uid).ok_or_else(|| {
            BackendError::message(format!(
                "object '{uid}' not found in calendar '{source_uri}'"
            ))
        })?;
        let destination = state
            .objects
            .entry(destination_uri.to_owned())
            .or_default();
        destination.insert(object.uid().to_owned(), object);
        Ok(())
    }
}

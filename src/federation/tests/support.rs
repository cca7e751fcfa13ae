//! Shared fixtures and test doubles for federation unit tests.

#![expect(
    clippy::expect_used,
    reason = "test fixtures use expect for setup clarity"
)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

use crate::federation::adapters::memory::{InMemoryBackend, MemoryOperationLog, NullCacheGate};
use crate::federation::domain::{
    Calendar, CalendarData, CalendarId, CalendarObject, ObjectData, OperationKind, TimePeriod,
    UserId,
};
use crate::federation::ports::{BackendError, BackendResult, CacheGate, CalendarBackend};
use crate::federation::services::{BackendRegistry, CalendarFederationService};

/// Dispatcher type used by the unit tests.
pub type TestService = CalendarFederationService<NullCacheGate, MemoryOperationLog>;

/// Backend wrapper whose canonical activation name is `database`.
///
/// Forwards everything to an [`InMemoryBackend`]; the wrapper exists so
/// tests exercise the type-derived canonical naming with a realistic
/// backend name.
pub struct Database {
    inner: InMemoryBackend,
}

impl Database {
    pub fn new() -> Self {
        Self {
            inner: InMemoryBackend::new(),
        }
    }

    pub fn with_capabilities(capabilities: impl IntoIterator<Item = OperationKind>) -> Self {
        Self {
            inner: InMemoryBackend::with_capabilities(capabilities),
        }
    }

    pub fn seed_calendar(&self, calendar: Calendar) {
        self.inner.seed_calendar(calendar).expect("seed calendar");
    }

    pub fn seed_object(&self, uri: &str, object: CalendarObject) {
        self.inner.seed_object(uri, object).expect("seed object");
    }
}

#[async_trait]
impl CalendarBackend for Database {
    fn type_path(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn supports(&self, operation: OperationKind) -> bool {
        self.inner.supports(operation)
    }

    async fn calendars(&self, user: &UserId) -> BackendResult<Vec<Calendar>> {
        self.inner.calendars(user).await
    }

    async fn find_calendar(&self, uri: &str) -> BackendResult<Option<Calendar>> {
        self.inner.find_calendar(uri).await
    }

    async fn is_calendar_writable(&self, uri: &str, user: &UserId) -> BackendResult<bool> {
        self.inner.is_calendar_writable(uri, user).await
    }

    async fn create_calendar(&self, data: &CalendarData) -> BackendResult<Calendar> {
        self.inner.create_calendar(data).await
    }

    async fn edit_calendar(&self, uri: &str, data: &CalendarData) -> BackendResult<Calendar> {
        self.inner.edit_calendar(uri, data).await
    }

    async fn delete_calendar(&self, uri: &str) -> BackendResult<()> {
        self.inner.delete_calendar(uri).await
    }

    async fn touch_calendar(&self, uri: &str) -> BackendResult<()> {
        self.inner.touch_calendar(uri).await
    }

    async fn merge_calendars(&self, destination_uri: &str, source_uri: &str) -> BackendResult<()> {
        self.inner.merge_calendars(destination_uri, source_uri).await
    }

    async fn objects(&self, uri: &str) -> BackendResult<Vec<CalendarObject>> {
        self.inner.objects(uri).await
    }

    async fn objects_in_period(
        &self,
        uri: &str,
        period: &TimePeriod,
    ) -> BackendResult<Vec<CalendarObject>> {
        self.inner.objects_in_period(uri, period).await
    }

    async fn find_object(&self, uri: &str, uid: &str) -> BackendResult<Option<CalendarObject>> {
        self.inner.find_object(uri, uid).await
    }

    async fn create_object(&self, uri: &str, data: &ObjectData) -> BackendResult<CalendarObject> {
        self.inner.create_object(uri, data).await
    }

    async fn edit_object(
        &self,
        uri: &str,
        uid: &str,
        data: &ObjectData,
    ) -> BackendResult<CalendarObject> {
        self.inner.edit_object(uri, uid, data).await
    }

    async fn delete_object(&self, uri: &str, uid: &str) -> BackendResult<()> {
        self.inner.delete_object(uri, uid).await
    }

    async fn move_object(
        &self,
        source_uri: &str,
        uid: &str,
        destination_uri: &str,
    ) -> BackendResult<()> {
        self.inner.move_object(source_uri, uid, destination_uri).await
    }
}

/// Backend that advertises every capability and fails every call.
pub struct FlakyBackend;

fn offline() -> BackendError {
    BackendError::message("backend offline")
}

#[async_trait]
impl CalendarBackend for FlakyBackend {
    fn type_path(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn supports(&self, _operation: OperationKind) -> bool {
        true
    }

    async fn calendars(&self, _user: &UserId) -> BackendResult<Vec<Calendar>> {
        Err(offline())
    }

    async fn find_calendar(&self, _uri: &str) -> BackendResult<Option<Calendar>> {
        Err(offline())
    }

    async fn is_calendar_writable(&self, _uri: &str, _user: &UserId) -> BackendResult<bool> {
        Err(offline())
    }

    async fn create_calendar(&self, _data: &CalendarData) -> BackendResult<Calendar> {
        Err(offline())
    }

    async fn edit_calendar(&self, _uri: &str, _data: &CalendarData) -> BackendResult<Calendar> {
        Err(offline())
    }

    async fn delete_calendar(&self, _uri: &str) -> BackendResult<()> {
        Err(offline())
    }

    async fn touch_calendar(&self, _uri: &str) -> BackendResult<()> {
        Err(offline())
    }

    async fn merge_calendars(
        &self,
        _destination_uri: &str,
        _source_uri: &str,
    ) -> BackendResult<()> {
        Err(offline())
    }

    async fn objects(&self, _uri: &str) -> BackendResult<Vec<CalendarObject>> {
        Err(offline())
    }

    async fn objects_in_period(
        &self,
        _uri: &str,
        _period: &TimePeriod,
    ) -> BackendResult<Vec<CalendarObject>> {
        Err(offline())
    }

    async fn find_object(&self, _uri: &str, _uid: &str) -> BackendResult<Option<CalendarObject>> {
        Err(offline())
    }

    async fn create_object(&self, _uri: &str, _data: &ObjectData) -> BackendResult<CalendarObject> {
        Err(offline())
    }

    async fn edit_object(
        &self,
        _uri: &str,
        _uid: &str,
        _data: &ObjectData,
    ) -> BackendResult<CalendarObject> {
        Err(offline())
    }

    async fn delete_object(&self, _uri: &str, _uid: &str) -> BackendResult<()> {
        Err(offline())
    }

    async fn move_object(
        &self,
        _source_uri: &str,
        _uid: &str,
        _destination_uri: &str,
    ) -> BackendResult<()> {
        Err(offline())
    }
}

/// Cache gate holding one fixed entry with a fixed staleness answer.
pub struct StaticCacheGate {
    entry: Option<(CalendarId, Calendar)>,
    stale: bool,
}

impl StaticCacheGate {
    pub fn fresh(id: CalendarId, calendar: Calendar) -> Self {
        Self {
            entry: Some((id, calendar)),
            stale: false,
        }
    }

    pub fn stale(id: CalendarId, calendar: Calendar) -> Self {
        Self {
            entry: Some((id, calendar)),
            stale: true,
        }
    }
}

#[async_trait]
impl CacheGate for StaticCacheGate {
    async fn lookup(&self, id: &CalendarId) -> Option<Calendar> {
        self.entry
            .as_ref()
            .filter(|(key, _)| key == id)
            .map(|(_, calendar)| calendar.clone())
    }

    async fn is_stale(&self, _id: &CalendarId) -> bool {
        self.stale
    }

    async fn store(&self, _id: &CalendarId, _calendar: &Calendar) {}
}

pub fn ada() -> UserId {
    UserId::new("ada").expect("valid user")
}

pub fn grace() -> UserId {
    UserId::new("grace").expect("valid user")
}

pub fn calendar(uri: &str, owner: &UserId) -> Calendar {
    Calendar::new(uri, owner.clone()).expect("valid calendar")
}

pub fn object(uid: &str) -> CalendarObject {
    CalendarObject::new(uid).expect("valid object")
}

/// Builds a period spanning the given hours of a fixed day.
pub fn period(start_hour: u32, end_hour: u32) -> TimePeriod {
    let start = Utc
        .with_ymd_and_hms(2024, 5, 1, start_hour, 0, 0)
        .single()
        .expect("valid start");
    let end = Utc
        .with_ymd_and_hms(2024, 5, 1, end_hour, 0, 0)
        .single()
        .expect("valid end");
    TimePeriod::new(start, end).expect("valid period")
}

pub fn parse_calendar_id(input: &str) -> CalendarId {
    CalendarId::parse(input).expect("valid calendar id")
}

/// Activates the given backends on a fresh registry and builds a
/// dispatcher with a null cache gate and a recording log.
pub fn service_over(
    backends: Vec<Arc<dyn CalendarBackend>>,
) -> (TestService, Arc<MemoryOperationLog>, Arc<BackendRegistry>) {
    let registry = Arc::new(BackendRegistry::new());
    for backend in backends {
        registry.activate(backend).expect("activate backend");
    }
    let log = Arc::new(MemoryOperationLog::new());
    let service = CalendarFederationService::new(
        Arc::clone(&registry),
        Arc::new(NullCacheGate::new()),
        Arc::clone(&log),
    );
    (service, log, registry)
}

/// A `database` backend seeded with the `personal` calendar holding the
/// timed objects `abc` and `xyz`.
pub fn seeded_database() -> Arc<Database> {
    let database = Database::new();
    database.seed_calendar(calendar("personal", &ada()));
    database.seed_object("personal", object("abc").with_period(period(9, 10)));
    database.seed_object("personal", object("xyz").with_period(period(20, 21)));
    Arc::new(database)
}

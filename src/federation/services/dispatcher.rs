//! Federated dispatch of calendar and object operations.
//!
//! Every operation decodes its composite identifiers, resolves the owning
//! backend through the registry, negotiates capabilities, and either
//! delegates or falls back to a designed emulation. Backend-reported
//! failures are logged and converted to absent or boolean results;
//! identifier and registry errors surface as typed failures.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::federation::domain::{
    BackendName, Calendar, CalendarData, CalendarId, CalendarObject, IdentifierError, ObjectData,
    ObjectId, OperationKind, TimePeriod, UserId,
};
use crate::federation::ports::{CacheGate, CalendarBackend, OperationLog, Severity};
use crate::federation::services::capability::Negotiation;
use crate::federation::services::registry::{BackendRegistry, RegistryError};

/// Log category used by dispatcher records.
const CATEGORY: &str = "dispatcher";

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;

/// Errors surfaced by the federation dispatcher.
///
/// Backend-reported failures do not appear here: the dispatcher logs them
/// and converts them to absent or boolean results, so callers check return
/// values rather than rely on interruption.
#[derive(Debug, Clone, Error)]
pub enum FederationError {
    /// A supplied identifier failed to encode or decode.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// Registry lookup or state access failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The backend does not support the operation and no fallback exists.
    #[error("backend '{backend}' does not support {operation}")]
    UnsupportedOperation {
        /// Canonical name of the refusing backend.
        backend: BackendName,
        /// Operation that was requested.
        operation: OperationKind,
    },

    /// The UID has never been observed by the UID index.
    #[error("uid '{0}' has not been observed by the uid index")]
    UidNotIndexed(String),

    /// Dispatcher index state was poisoned by a panicking writer.
    #[error("federation index state poisoned: {0}")]
    Poisoned(String),
}

/// Filters applied by [`CalendarFederationService::list_calendars`].
#[derive(Debug, Clone, Default)]
pub struct CalendarFilter {
    active_only: bool,
    writable_only: bool,
    backends: Option<Vec<BackendName>>,
}

impl CalendarFilter {
    /// Creates a filter that keeps everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops calendars flagged disabled (and hidden ones).
    #[must_use]
    pub const fn with_active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Drops calendars the backend reports as non-writable for the user.
    #[must_use]
    pub const fn with_writable_only(mut self) -> Self {
        self.writable_only = true;
        self
    }

    /// Restricts listing to the given backends, which must all be
    /// activated.
    #[must_use]
    pub fn with_backends(mut self, backends: impl IntoIterator<Item = BackendName>) -> Self {
        self.backends = Some(backends.into_iter().collect());
        self
    }
}

/// Dispatcher-local lazily populated lookup state.
#[derive(Debug, Default)]
struct FederationIndexes {
    /// Bare UID to full composite identifier. Populated where objects are
    /// observed on read paths; never invalidated automatically.
    uids: HashMap<String, ObjectId>,
    /// Composite identifiers hidden by the degraded delete paths.
    hidden: HashSet<String>,
}

/// Federated calendar dispatcher: the public operation surface.
///
/// Generic over the cache gate and operation log ports, in the same way
/// the registry service is generic over its collaborators.
#[derive(Clone)]
pub struct CalendarFederationService<G, L>
where
    G: CacheGate,
    L: OperationLog,
{
    registry: Arc<BackendRegistry>,
    cache: Arc<G>,
    log: Arc<L>,
    indexes: Arc<RwLock<FederationIndexes>>,
}

impl<G, L> CalendarFederationService<G, L>
where
    G: CacheGate,
    L: OperationLog,
{
    /// Creates a dispatcher over the given registry, cache gate, and log.
    #[must_use]
    pub fn new(registry: Arc<BackendRegistry>, cache: Arc<G>, log: Arc<L>) -> Self {
        Self {
            registry,
            cache,
            log,
            indexes: Arc::new(RwLock::new(FederationIndexes::default())),
        }
    }

    /// Lists the calendars visible to the user across the backends in
    /// scope.
    ///
    /// Results are tagged with their owning backend and concatenated in
    /// backend-iteration order, preserving each backend's own order within
    /// its segment; no cross-backend sort is applied. A backend whose
    /// listing call fails contributes an empty segment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when an explicit backend
    /// subset names a backend that is not activated.
    pub async fn list_calendars(
        &self,
        user: &UserId,
        filter: &CalendarFilter,
    ) -> FederationResult<Vec<Calendar>> {
        let scope = self.scoped_backends(filter)?;
        let mut listed = Vec::new();
        for (name, backend) in scope {
            match backend.calendars(user).await {
                Ok(calendars) => {
                    self.collect_filtered(&mut listed, calendars, &name, backend.as_ref(), user, filter)
                        .await?;
                }
                Err(err) => self.log_error(format!(
                    "backend '{name}' failed to list calendars: {err}"
                )),
            }
        }
        Ok(listed)
    }

    /// Fetches one calendar by composite identifier.
    ///
    /// The cache gate is consulted first; a present, non-stale entry is
    /// returned without touching the backend. Absence is `Ok(None)`, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when the backend segment
    /// resolves to no activated backend.
    pub async fn get_calendar(&self, id: &CalendarId) -> FederationResult<Option<Calendar>> {
        if let Some(cached) = self.cache.lookup(id).await {
            if !self.cache.is_stale(id).await {
                return Ok(Some(cached));
            }
        }

        let (name, backend) = self.resolve(id.backend())?;
        match backend.find_calendar(id.calendar()).await {
            Ok(Some(calendar)) => {
                let tagged = calendar.tagged(&name)?;
                self.cache.store(id, &tagged).await;
                Ok(Some(tagged))
            }
            Ok(None) => {
                self.log_info(format!("calendar '{id}' not found"));
                Ok(None)
            }
            Err(err) => {
                self.log_error(format!("backend '{name}' failed to fetch '{id}': {err}"));
                Ok(None)
            }
        }
    }

    /// Creates a calendar on the named backend.
    ///
    /// `Ok(None)` means the backend attempted the creation and reported
    /// failure (logged).
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the backend
    /// lacks the capability; calendar creation has no fallback.
    pub async fn create_calendar(
        &self,
        backend_name: &BackendName,
        data: &CalendarData,
    ) -> FederationResult<Option<Calendar>> {
        let (name, backend) = self.resolve(backend_name.as_str())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::CreateCalendar) {
            Negotiation::Delegate => match backend.create_calendar(data).await {
                Ok(calendar) => Ok(Some(calendar.tagged(&name)?)),
                Err(err) => {
                    self.log_error(format!("backend '{name}' failed to create calendar: {err}"));
                    Ok(None)
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.unsupported(name, OperationKind::CreateCalendar)
            }
        }
    }

    /// Edits a calendar in place.
    ///
    /// `Ok(None)` means the backend attempted the edit and reported
    /// failure (logged).
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the backend
    /// lacks the capability; calendar editing has no fallback.
    pub async fn edit_calendar(
        &self,
        id: &CalendarId,
        data: &CalendarData,
    ) -> FederationResult<Option<Calendar>> {
        let (name, backend) = self.resolve(id.backend())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::EditCalendar) {
            Negotiation::Delegate => match backend.edit_calendar(id.calendar(), data).await {
                Ok(calendar) => Ok(Some(calendar.tagged(&name)?)),
                Err(err) => {
                    self.log_error(format!("backend '{name}' failed to edit '{id}': {err}"));
                    Ok(None)
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.unsupported(name, OperationKind::EditCalendar)
            }
        }
    }

    /// Bumps a calendar's change marker.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the backend
    /// lacks the capability; touch has no fallback.
    pub async fn touch_calendar(&self, id: &CalendarId) -> FederationResult<bool> {
        let (name, backend) = self.resolve(id.backend())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::TouchCalendar) {
            Negotiation::Delegate => match backend.touch_calendar(id.calendar()).await {
                Ok(()) => Ok(true),
                Err(err) => {
                    self.log_error(format!("backend '{name}' failed to touch '{id}': {err}"));
                    Ok(false)
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.unsupported(name, OperationKind::TouchCalendar)
            }
        }
    }

    /// Deletes a calendar, degrading to hiding it when the backend lacks
    /// the capability.
    ///
    /// The degraded path still reports success: the calendar disappears
    /// from listings while its underlying data stays put. `Ok(false)`
    /// means the backend attempted the deletion and reported failure.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when the backend segment
    /// resolves to no activated backend.
    pub async fn delete_calendar(&self, id: &CalendarId) -> FederationResult<bool> {
        let (name, backend) = self.resolve(id.backend())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::DeleteCalendar) {
            Negotiation::Delegate => match backend.delete_calendar(id.calendar()).await {
                Ok(()) => Ok(true),
                Err(err) => {
                    self.log_error(format!("backend '{name}' failed to delete '{id}': {err}"));
                    Ok(false)
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.log_warning(format!(
                    "backend '{name}' cannot delete calendar '{id}'; hiding it instead"
                ));
                self.write_indexes()?.hidden.insert(id.to_string());
                Ok(true)
            }
        }
    }

    /// Lists every object in the calendar, decorated with composite
    /// identifiers.
    ///
    /// A failing backend yields an empty listing (logged). Hidden objects
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when the backend segment
    /// resolves to no activated backend.
    pub async fn list_objects(&self, id: &CalendarId) -> FederationResult<Vec<CalendarObject>> {
        let (name, backend) = self.resolve(id.backend())?;
        let objects = match backend.objects(id.calendar()).await {
            Ok(objects) => objects,
            Err(err) => {
                self.log_error(format!("backend '{name}' failed to list '{id}': {err}"));
                Vec::new()
            }
        };
        self.observe_objects(id, objects)
    }

    /// Lists the objects whose time bounds intersect `[start, end]`
    /// (inclusive), decorated with composite identifiers.
    ///
    /// Delegates to the backend when it supports period-bounded listing;
    /// otherwise fetches everything and filters locally. Objects without
    /// time bounds are excluded either way.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when the backend segment
    /// resolves to no activated backend.
    pub async fn list_objects_in_period(
        &self,
        id: &CalendarId,
        period: &TimePeriod,
    ) -> FederationResult<Vec<CalendarObject>> {
        let (name, backend) = self.resolve(id.backend())?;
        let objects = match Negotiation::for_operation(backend.as_ref(), OperationKind::ObjectsInPeriod)
        {
            Negotiation::Delegate => match backend.objects_in_period(id.calendar(), period).await {
                Ok(objects) => objects,
                Err(err) => {
                    self.log_error(format!("backend '{name}' failed to list '{id}': {err}"));
                    Vec::new()
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                match backend.objects(id.calendar()).await {
                    Ok(objects) => objects
                        .into_iter()
                        .filter(|object| {
                            object
                                .period()
                                .is_some_and(|bounds| bounds.intersects(period))
                        })
                        .collect(),
                    Err(err) => {
                        self.log_error(format!("backend '{name}' failed to list '{id}': {err}"));
                        Vec::new()
                    }
                }
            }
        };
        self.observe_objects(id, objects)
    }

    /// Fetches one object by composite identifier.
    ///
    /// Absence is `Ok(None)`, not an error. Found objects are decorated
    /// and observed into the UID index.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when the backend segment
    /// resolves to no activated backend.
    pub async fn find_object(&self, id: &ObjectId) -> FederationResult<Option<CalendarObject>> {
        let (name, backend) = self.resolve(id.backend())?;
        match backend.find_object(id.calendar(), id.uid()).await {
            Ok(Some(object)) => {
                self.write_indexes()?
                    .uids
                    .insert(id.uid().to_owned(), id.clone());
                Ok(Some(object.tagged(id)))
            }
            Ok(None) => {
                self.log_info(format!("object '{id}' not found"));
                Ok(None)
            }
            Err(err) => {
                self.log_error(format!("backend '{name}' failed to fetch '{id}': {err}"));
                Ok(None)
            }
        }
    }

    /// Looks an object up by bare UID through the UID index.
    ///
    /// This is not a backend search: the index is populated lazily as
    /// objects are observed on read paths and is best-effort by contract.
    /// `Ok(None)` means the index entry points at an object that no longer
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UidNotIndexed`] when the UID has never
    /// been observed.
    pub async fn find_object_by_uid(&self, uid: &str) -> FederationResult<Option<CalendarObject>> {
        let indexed = self.read_indexes()?.uids.get(uid).cloned();
        let Some(id) = indexed else {
            return Err(FederationError::UidNotIndexed(uid.to_owned()));
        };
        self.find_object(&id).await
    }

    /// Creates an object inside the calendar.
    ///
    /// `Ok(None)` means the backend attempted the creation and reported
    /// failure (logged). Created objects are not observed into the UID
    /// index; only read paths populate it.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the backend
    /// lacks the capability; object creation has no fallback.
    pub async fn create_object(
        &self,
        id: &CalendarId,
        data: &ObjectData,
    ) -> FederationResult<Option<CalendarObject>> {
        let (name, backend) = self.resolve(id.backend())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::CreateObject) {
            Negotiation::Delegate => match backend.create_object(id.calendar(), data).await {
                Ok(object) => {
                    let object_id = id.object(object.uid())?;
                    Ok(Some(object.tagged(&object_id)))
                }
                Err(err) => {
                    self.log_error(format!(
                        "backend '{name}' failed to create object in '{id}': {err}"
                    ));
                    Ok(None)
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.unsupported(name, OperationKind::CreateObject)
            }
        }
    }

    /// Edits an object in place.
    ///
    /// `Ok(None)` means the backend attempted the edit and reported
    /// failure (logged).
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the backend
    /// lacks the capability; object editing has no fallback.
    pub async fn edit_object(
        &self,
        id: &ObjectId,
        data: &ObjectData,
    ) -> FederationResult<Option<CalendarObject>> {
        let (name, backend) = self.resolve(id.backend())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::EditObject) {
            Negotiation::Delegate => {
                match backend.edit_object(id.calendar(), id.uid(), data).await {
                    Ok(object) => Ok(Some(object.tagged(id))),
                    Err(err) => {
                        self.log_error(format!("backend '{name}' failed to edit '{id}': {err}"));
                        Ok(None)
                    }
                }
            }
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.unsupported(name, OperationKind::EditObject)
            }
        }
    }

    /// Deletes an object, degrading to hiding it in place when the backend
    /// lacks the capability.
    ///
    /// The degraded path still reports success. `Ok(false)` means the
    /// backend attempted the deletion and reported failure. The UID index
    /// is deliberately left alone; it is never invalidated automatically.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when the backend segment
    /// resolves to no activated backend.
    pub async fn delete_object(&self, id: &ObjectId) -> FederationResult<bool> {
        let (name, backend) = self.resolve(id.backend())?;
        match Negotiation::for_operation(backend.as_ref(), OperationKind::DeleteObject) {
            Negotiation::Delegate => match backend.delete_object(id.calendar(), id.uid()).await {
                Ok(()) => Ok(true),
                Err(err) => {
                    self.log_error(format!("backend '{name}' failed to delete '{id}': {err}"));
                    Ok(false)
                }
            },
            Negotiation::Emulate | Negotiation::Unsupported => {
                self.log_warning(format!(
                    "backend '{name}' cannot delete object '{id}'; hiding it instead"
                ));
                self.write_indexes()?.hidden.insert(id.to_string());
                Ok(true)
            }
        }
    }

    /// Moves an object natively within one backend.
    ///
    /// This is the bare native path only: source and destination must
    /// share a backend that supports move. Cross-backend and emulated
    /// moves are composed from primitives by the merge service. `Ok(false)`
    /// means the backend attempted the move and reported failure.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the move
    /// cannot be delegated natively.
    pub async fn move_object(
        &self,
        id: &ObjectId,
        destination: &CalendarId,
    ) -> FederationResult<bool> {
        let (name, backend) = self.resolve(id.backend())?;
        if id.backend() != destination.backend()
            || !backend.supports(OperationKind::MoveObject)
        {
            return self.unsupported(name, OperationKind::MoveObject);
        }
        match backend
            .move_object(id.calendar(), id.uid(), destination.calendar())
            .await
        {
            Ok(()) => Ok(true),
            Err(err) => {
                self.log_error(format!("backend '{name}' failed to move '{id}': {err}"));
                Ok(false)
            }
        }
    }

    /// Merges one calendar into another natively within one backend.
    ///
    /// Native path only, mirroring [`Self::move_object`]; the merge
    /// service emulates everything else. `Ok(false)` means the backend
    /// attempted the merge and reported failure.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::UnsupportedOperation`] when the merge
    /// cannot be delegated natively.
    pub async fn merge_calendar(
        &self,
        destination: &CalendarId,
        source: &CalendarId,
    ) -> FederationResult<bool> {
        let (name, backend) = self.resolve(destination.backend())?;
        if source.backend() != destination.backend()
            || !backend.supports(OperationKind::MergeCalendars)
        {
            return self.unsupported(name, OperationKind::MergeCalendars);
        }
        match backend
            .merge_calendars(destination.calendar(), source.calendar())
            .await
        {
            Ok(()) => Ok(true),
            Err(err) => {
                self.log_error(format!(
                    "backend '{name}' failed to merge '{source}' into '{destination}': {err}"
                ));
                Ok(false)
            }
        }
    }

    /// Resolves the backends a listing operates over.
    fn scoped_backends(
        &self,
        filter: &CalendarFilter,
    ) -> FederationResult<Vec<(BackendName, Arc<dyn CalendarBackend>)>> {
        match &filter.backends {
            Some(subset) => subset
                .iter()
                .map(|name| self.resolve(name.as_str()))
                .collect(),
            None => Ok(self.registry.active()?),
        }
    }

    /// Applies the active and writable filters to one backend's listing
    /// and appends the tagged survivors.
    async fn collect_filtered(
        &self,
        listed: &mut Vec<Calendar>,
        calendars: Vec<Calendar>,
        name: &BackendName,
        backend: &dyn CalendarBackend,
        user: &UserId,
        filter: &CalendarFilter,
    ) -> FederationResult<()> {
        for calendar in calendars {
            if filter.active_only && !calendar.is_active() {
                continue;
            }
            let Ok(id) = calendar.composite_id(name) else {
                self.log_warning(format!(
                    "calendar '{}' on backend '{name}' is not addressable; skipping",
                    calendar.uri()
                ));
                continue;
            };
            if self.read_indexes()?.hidden.contains(&id.to_string()) {
                continue;
            }
            if filter.writable_only
                && !self.calendar_writable(backend, name, &calendar, user).await
            {
                continue;
            }
            match calendar.tagged(name) {
                Ok(tagged) => listed.push(tagged),
                Err(err) => self.log_warning(format!(
                    "calendar on backend '{name}' is not addressable: {err}"
                )),
            }
        }
        Ok(())
    }

    /// Asks the backend whether the user may write the calendar, treating
    /// failures as non-writable.
    async fn calendar_writable(
        &self,
        backend: &dyn CalendarBackend,
        name: &BackendName,
        calendar: &Calendar,
        user: &UserId,
    ) -> bool {
        match backend.is_calendar_writable(calendar.uri(), user).await {
            Ok(writable) => writable,
            Err(err) => {
                self.log_error(format!(
                    "backend '{name}' failed writability check for '{}': {err}",
                    calendar.uri()
                ));
                false
            }
        }
    }

    /// Decorates observed objects with composite identifiers, records them
    /// in the UID index, and drops hidden ones.
    fn observe_objects(
        &self,
        calendar: &CalendarId,
        objects: Vec<CalendarObject>,
    ) -> FederationResult<Vec<CalendarObject>> {
        let mut indexes = self.write_indexes()?;
        let mut decorated = Vec::with_capacity(objects.len());
        for object in objects {
            let object_id = match calendar.object(object.uid()) {
                Ok(object_id) => object_id,
                Err(err) => {
                    self.log_warning(format!(
                        "object '{}' in '{calendar}' is not addressable: {err}",
                        object.uid()
                    ));
                    continue;
                }
            };
            indexes
                .uids
                .insert(object.uid().to_owned(), object_id.clone());
            if indexes.hidden.contains(&object_id.to_string()) {
                continue;
            }
            decorated.push(object.tagged(&object_id));
        }
        Ok(decorated)
    }

    /// Resolves a backend segment, logging a miss before surfacing it.
    fn resolve(&self, segment: &str) -> FederationResult<(BackendName, Arc<dyn CalendarBackend>)> {
        self.registry.resolve(segment).map_err(|err| {
            if matches!(err, RegistryError::BackendNotFound(_)) {
                self.log_error(format!("no activated backend for segment '{segment}'"));
            }
            FederationError::Registry(err)
        })
    }

    /// Logs and returns the unsupported-operation failure.
    fn unsupported<T>(
        &self,
        backend: BackendName,
        operation: OperationKind,
    ) -> FederationResult<T> {
        self.log_warning(format!(
            "backend '{backend}' does not support {operation}"
        ));
        Err(FederationError::UnsupportedOperation { backend, operation })
    }

    fn log_info(&self, message: String) {
        self.log.record(CATEGORY, &message, Severity::Info);
    }

    fn log_warning(&self, message: String) {
        self.log.record(CATEGORY, &message, Severity::Warning);
    }

    fn log_error(&self, message: String) {
        self.log.record(CATEGORY, &message, Severity::Error);
    }

    fn read_indexes(&self) -> FederationResult<RwLockReadGuard<'_, FederationIndexes>> {
        self.indexes
            .read()
            .map_err(|err| FederationError::Poisoned(err.to_string()))
    }

    fn write_indexes(&self) -> FederationResult<RwLockWriteGuard<'_, FederationIndexes>> {
        self.indexes
            .write()
            .map_err(|err| FederationError::Poisoned(err.to_string()))
    }
}

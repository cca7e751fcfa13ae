//! Shared world state for calendar merge BDD scenarios.

use std::sync::Arc;

use almanac::federation::adapters::memory::{InMemoryBackend, MemoryOperationLog, NullCacheGate};
use almanac::federation::domain::{Calendar, CalendarId, CalendarObject, OperationKind, UserId};
use almanac::federation::ports::CalendarBackend;
use almanac::federation::services::{
    BackendRegistry, CalendarFederationService, CalendarMergeService, FederationError,
    MergeReport,
};
use rstest::fixture;

/// Dispatcher type used by the BDD world.
pub type WorldService = CalendarFederationService<NullCacheGate, MemoryOperationLog>;

/// Merge engine type used by the BDD world.
pub type WorldEngine = CalendarMergeService<NullCacheGate, MemoryOperationLog>;

/// Scenario world for calendar merge behaviour tests.
pub struct MergeWorld {
    /// Registry backing the services under test.
    pub registry: Arc<BackendRegistry>,
    /// The dispatcher under test.
    pub federation: Arc<WorldService>,
    /// The merge engine under test.
    pub engine: WorldEngine,
    /// Backend seeded by the scenario, if one was activated.
    pub backend: Option<Arc<InMemoryBackend>>,
    /// Result of the last merge call.
    pub last_report: Option<MergeReport>,
    /// Result of the last delete call.
    pub last_delete: Option<bool>,
    /// Result of the last calendar fetch.
    pub last_fetch: Option<Result<Option<Calendar>, FederationError>>,
}

impl MergeWorld {
    /// Creates a world with an empty registry and fresh services.
    #[must_use]
    pub fn new() -> Self {
        let registry = Arc::new(BackendRegistry::new());
        let federation = Arc::new(CalendarFederationService::new(
            Arc::clone(&registry),
            Arc::new(NullCacheGate::new()),
            Arc::new(MemoryOperationLog::new()),
        ));
        let engine = CalendarMergeService::new(Arc::clone(&federation));
        Self {
            registry,
            federation,
            engine,
            backend: None,
            last_report: None,
            last_delete: None,
            last_fetch: None,
        }
    }

    /// Activates a backend restricted to the given capabilities and keeps
    /// a seeding handle to it.
    pub fn activate_backend(
        &mut self,
        capabilities: impl IntoIterator<Item = OperationKind>,
    ) -> Result<(), eyre::Report> {
        let backend = Arc::new(InMemoryBackend::with_capabilities(capabilities));
        self.registry
            .activate(Arc::clone(&backend) as Arc<dyn CalendarBackend>)
            .map_err(|err| eyre::eyre!("activation failed: {err}"))?;
        self.backend = Some(backend);
        Ok(())
    }

    /// Returns the seeding handle for the scenario backend.
    pub fn backend(&self) -> Result<&Arc<InMemoryBackend>, eyre::Report> {
        self.backend
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no backend activated in scenario world"))
    }
}

impl Default for MergeWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MergeWorld {
    MergeWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Owner used for every calendar in the scenarios.
pub fn owner() -> Result<UserId, eyre::Report> {
    UserId::new("ada").map_err(|err| eyre::eyre!("invalid owner: {err}"))
}

/// Builds the composite identifier of a scenario calendar.
pub fn scenario_calendar_id(name: &str) -> Result<CalendarId, eyre::Report> {
    CalendarId::new("inmemorybackend", name)
        .map_err(|err| eyre::eyre!("invalid calendar id: {err}"))
}

/// Builds a plain calendar owned by the scenario user.
pub fn scenario_calendar(name: &str) -> Result<Calendar, eyre::Report> {
    let user = owner()?;
    Calendar::new(name, user).map_err(|err| eyre::eyre!("invalid calendar: {err}"))
}

/// Builds a plain object.
pub fn scenario_object(uid: &str) -> Result<CalendarObject, eyre::Report> {
    CalendarObject::new(uid).map_err(|err| eyre::eyre!("invalid object: {err}"))
}

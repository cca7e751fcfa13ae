//! Backend registry: descriptors, factory table, and activated instances.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::federation::adapters::memory::InMemoryBackend;
use crate::federation::domain::{BackendDescriptor, BackendName};
use crate::federation::ports::{BackendError, CalendarBackend};

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Constructor for backends referenced by descriptor name.
///
/// Factories receive the descriptor's stored constructor arguments; they
/// replace the original design's runtime type reflection with an explicit
/// table registered at startup.
pub type BackendFactory =
    Arc<dyn Fn(&[Value]) -> Result<Arc<dyn CalendarBackend>, BackendError> + Send + Sync>;

/// Errors returned by the backend registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The backend's type path does not reduce to a usable canonical name.
    #[error("backend type '{0}' does not yield a usable canonical name")]
    InvalidBackend(String),

    /// No activated backend answers to the given identifier segment.
    #[error("no activated backend named '{0}'")]
    BackendNotFound(String),

    /// Registry state was poisoned by a panicking writer.
    #[error("registry state poisoned: {0}")]
    Poisoned(String),
}

/// Report produced by [`BackendRegistry::setup_all`].
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    /// Canonical names activated by this setup pass.
    pub activated: Vec<BackendName>,
    /// Descriptors that were not activated, with the reason.
    pub skipped: Vec<SkippedDescriptor>,
}

/// A descriptor skipped during [`BackendRegistry::setup_all`].
#[derive(Debug, Clone)]
pub struct SkippedDescriptor {
    /// Descriptor name as registered.
    pub descriptor: String,
    /// Why the descriptor was not activated.
    pub reason: String,
}

#[derive(Default)]
struct RegistryState {
    descriptors: Vec<BackendDescriptor>,
    factories: HashMap<String, BackendFactory>,
    active: BTreeMap<BackendName, Arc<dyn CalendarBackend>>,
}

/// Backend descriptor and activation registry.
///
/// Owned by the application context and handed to the federation services
/// by reference; there is no process-global registry. The lifecycle has
/// two phases: descriptors and factories are populated during
/// configuration and backends activated during setup, after which
/// serving-phase access is read-mostly. Concurrent `activate`/`reset`
/// during serving requires external exclusion.
///
/// The activated table is ordered by canonical name, which fixes the
/// backend-iteration order of multi-backend listings.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a backend descriptor.
    ///
    /// Nothing is constructed. Duplicates of the same name are all
    /// retained; the last registration wins when [`Self::setup_all`] runs.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn register(&self, descriptor: BackendDescriptor) -> RegistryResult<()> {
        self.write_state()?.descriptors.push(descriptor);
        Ok(())
    }

    /// Registers the constructor for descriptors of the given name.
    ///
    /// A later registration under the same name replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn register_factory<F>(&self, name: impl Into<String>, factory: F) -> RegistryResult<()>
    where
        F: Fn(&[Value]) -> Result<Arc<dyn CalendarBackend>, BackendError> + Send + Sync + 'static,
    {
        self.write_state()?
            .factories
            .insert(name.into(), Arc::new(factory));
        Ok(())
    }

    /// Activates a backend instance under its canonical name.
    ///
    /// The canonical name derives from the instance's concrete type path,
    /// so re-activating the same backend type overwrites the previous
    /// instance: at most one activated backend exists per canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidBackend`] when the type path does
    /// not reduce to a usable canonical name, or
    /// [`RegistryError::Poisoned`] when the registry state is unavailable.
    pub fn activate(&self, backend: Arc<dyn CalendarBackend>) -> RegistryResult<BackendName> {
        let name = canonical_name(backend.type_path())?;
        self.write_state()?.active.insert(name.clone(), backend);
        Ok(name)
    }

    /// Constructs and activates the default in-memory backend.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn activate_default(&self) -> RegistryResult<BackendName> {
        self.activate(Arc::new(InMemoryBackend::new()))
    }

    /// Constructs and activates every descriptor whose factory resolves.
    ///
    /// One construction per descriptor name: the last registration wins
    /// among duplicates, processed in first-registration order. Names
    /// without a factory, failing constructors, unusable type paths, and
    /// canonical names that are already active are skipped and reported,
    /// never fatal.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn setup_all(&self) -> RegistryResult<SetupReport> {
        let (chosen, factories) = {
            let state = self.read_state()?;
            (
                collapse_descriptors(&state.descriptors),
                state.factories.clone(),
            )
        };

        let mut report = SetupReport::default();
        for descriptor in chosen {
            let Some(factory) = factories.get(descriptor.name()) else {
                report.skipped.push(SkippedDescriptor {
                    descriptor: descriptor.name().to_owned(),
                    reason: "no factory registered".to_owned(),
                });
                continue;
            };
            match factory(descriptor.args()) {
                Ok(backend) => self.activate_constructed(&descriptor, backend, &mut report)?,
                Err(err) => report.skipped.push(SkippedDescriptor {
                    descriptor: descriptor.name().to_owned(),
                    reason: format!("constructor failed: {err}"),
                }),
            }
        }
        Ok(report)
    }

    fn activate_constructed(
        &self,
        descriptor: &BackendDescriptor,
        backend: Arc<dyn CalendarBackend>,
        report: &mut SetupReport,
    ) -> RegistryResult<()> {
        let name = match canonical_name(backend.type_path()) {
            Ok(name) => name,
            Err(err) => {
                report.skipped.push(SkippedDescriptor {
                    descriptor: descriptor.name().to_owned(),
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };

        let mut state = self.write_state()?;
        if state.active.contains_key(&name) {
            report.skipped.push(SkippedDescriptor {
                descriptor: descriptor.name().to_owned(),
                reason: format!("canonical name '{name}' is already activated"),
            });
            return Ok(());
        }
        state.active.insert(name.clone(), backend);
        report.activated.push(name);
        Ok(())
    }

    /// Returns the registered descriptors in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn descriptors(&self) -> RegistryResult<Vec<BackendDescriptor>> {
        Ok(self.read_state()?.descriptors.clone())
    }

    /// Returns the canonical names of activated backends, lexicographically
    /// ordered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn active_names(&self) -> RegistryResult<Vec<BackendName>> {
        Ok(self.read_state()?.active.keys().cloned().collect())
    }

    /// Returns every activated backend in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn active(&self) -> RegistryResult<Vec<(BackendName, Arc<dyn CalendarBackend>)>> {
        let state = self.read_state()?;
        Ok(state
            .active
            .iter()
            .map(|(name, backend)| (name.clone(), Arc::clone(backend)))
            .collect())
    }

    /// Resolves an identifier segment to its activated backend.
    ///
    /// The match is exact and case-sensitive: canonical names are
    /// lowercase, so a segment differing only in case does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BackendNotFound`] when no activated
    /// backend carries the segment as its canonical name, or
    /// [`RegistryError::Poisoned`] when the registry state is unavailable.
    pub fn resolve(
        &self,
        segment: &str,
    ) -> RegistryResult<(BackendName, Arc<dyn CalendarBackend>)> {
        let state = self.read_state()?;
        state
            .active
            .get_key_value(segment)
            .map(|(name, backend)| (name.clone(), Arc::clone(backend)))
            .ok_or_else(|| RegistryError::BackendNotFound(segment.to_owned()))
    }

    /// Clears the activated-backend table.
    ///
    /// Descriptors and factories are retained, so a later
    /// [`Self::setup_all`] can rebuild the table. Used between test runs
    /// and context switches.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry state is
    /// unavailable.
    pub fn reset(&self) -> RegistryResult<()> {
        self.write_state()?.active.clear();
        Ok(())
    }

    fn read_state(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryState>> {
        self.state
            .read()
            .map_err(|err| RegistryError::Poisoned(err.to_string()))
    }

    fn write_state(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        self.state
            .write()
            .map_err(|err| RegistryError::Poisoned(err.to_string()))
    }
}

/// Derives the canonical activation name from a concrete type path.
fn canonical_name(type_path: &str) -> RegistryResult<BackendName> {
    BackendName::from_type_path(type_path)
        .map_err(|_| RegistryError::InvalidBackend(type_path.to_owned()))
}

/// Collapses duplicate descriptor names: one entry per name, carrying the
/// last-registered descriptor, ordered by first registration.
fn collapse_descriptors(descriptors: &[BackendDescriptor]) -> Vec<BackendDescriptor> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, BackendDescriptor> = HashMap::new();
    for descriptor in descriptors {
        if !latest.contains_key(descriptor.name()) {
            order.push(descriptor.name().to_owned());
        }
        latest.insert(descriptor.name().to_owned(), descriptor.clone());
    }
    order
        .iter()
        .filter_map(|name| latest.get(name).cloned())
        .collect()
}

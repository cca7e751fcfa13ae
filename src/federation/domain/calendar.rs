//! Calendar aggregate and its creation/edit payload.

use super::{BackendName, CalendarDomainError, CalendarId, IdentifierError, SEGMENT_DELIMITER, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A calendar as seen through the federation layer.
///
/// Backends hand out calendars with backend-local URIs; the federation
/// layer tags each one with the owning backend's canonical name before it
/// crosses the API boundary (see [`Calendar::tagged`]). Writability is a
/// backend predicate, not a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    uri: String,
    owner: UserId,
    active: bool,
    properties: Map<String, Value>,
}

impl Calendar {
    /// Property key under which the federation layer stores the composite
    /// identifier.
    pub const ID_PROPERTY: &'static str = "id";

    /// Creates a calendar with the given backend-local URI and owner.
    ///
    /// The calendar starts active with no properties.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::EmptyCalendarUri`] when the URI is
    /// empty after trimming.
    pub fn new(uri: impl Into<String>, owner: UserId) -> Result<Self, CalendarDomainError> {
        let raw = uri.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CalendarDomainError::EmptyCalendarUri);
        }

        Ok(Self {
            uri: trimmed.to_owned(),
            owner,
            active: true,
            properties: Map::new(),
        })
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Returns the calendar URI (backend-local, or composite once tagged).
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Returns whether the calendar is enabled for listing.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the property map.
    #[must_use]
    pub const fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Returns a single property value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Applies an edit payload: active flag and owner when supplied, and a
    /// property merge. The URI is identity and is never changed by edits.
    pub fn apply(&mut self, data: &CalendarData) {
        if let Some(active) = data.active() {
            self.active = active;
        }
        if let Some(owner) = data.owner() {
            self.owner = owner.clone();
        }
        for (name, value) in data.properties() {
            self.properties.insert(name.clone(), value.clone());
        }
    }

    /// Derives the composite identifier of this calendar under the given
    /// backend, from the backend-local URI.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSegment`] when the local URI
    /// contains the segment delimiter and therefore cannot be addressed.
    pub fn composite_id(&self, backend: &BackendName) -> Result<CalendarId, IdentifierError> {
        CalendarId::new(backend.as_str(), self.local_uri(backend))
    }

    /// Tags the calendar with its owning backend: the URI becomes the
    /// composite form `backend.local_uri` and the composite identifier is
    /// recorded under [`Self::ID_PROPERTY`].
    ///
    /// Tagging is idempotent and reconstructible from the backend name and
    /// the local URI alone.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSegment`] when the local URI
    /// contains the segment delimiter.
    pub fn tagged(mut self, backend: &BackendName) -> Result<Self, IdentifierError> {
        let id = self.composite_id(backend)?;
        self.uri = id.to_string();
        self.properties
            .insert(Self::ID_PROPERTY.to_owned(), Value::String(self.uri.clone()));
        Ok(self)
    }

    /// Returns the URI with any `backend.` prefix stripped.
    fn local_uri(&self, backend: &BackendName) -> &str {
        self.uri
            .strip_prefix(backend.as_str())
            .and_then(|rest| rest.strip_prefix(SEGMENT_DELIMITER))
            .unwrap_or(&self.uri)
    }
}

/// Creation/edit payload for calendars.
///
/// Every field is optional: creation fills in defaults (a generated URI,
/// active state) and edits only touch the supplied fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarData {
    uri: Option<String>,
    owner: Option<UserId>,
    active: Option<bool>,
    properties: Map<String, Value>,
}

impl CalendarData {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend-local URI to create the calendar under.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Returns the requested URI, if any.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Returns the requested owner, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Returns the requested active flag, if any.
    #[must_use]
    pub const fn active(&self) -> Option<bool> {
        self.active
    }

    /// Returns the properties to set.
    #[must_use]
    pub const fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

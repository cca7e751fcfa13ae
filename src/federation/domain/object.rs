//! Calendar object aggregate and its creation/edit payload.

use super::{CalendarDomainError, ObjectId, TimePeriod};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event, journal, or to-do inside a calendar.
///
/// The federation layer does not parse object content; properties are an
/// opaque map and the time bounds used for period filtering are carried as
/// a structured optional field. The externally visible identifier
/// (`backend.calendar.uid`) is derived, never stored by backends, and
/// recorded under [`Self::ID_PROPERTY`] when the object crosses the API
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarObject {
    uid: String,
    period: Option<TimePeriod>,
    properties: Map<String, Value>,
}

impl CalendarObject {
    /// Property key under which the federation layer stores the composite
    /// identifier.
    pub const ID_PROPERTY: &'static str = "id";

    /// Creates an object with the given UID.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarDomainError::EmptyObjectUid`] when the UID is
    /// empty after trimming.
    pub fn new(uid: impl Into<String>) -> Result<Self, CalendarDomainError> {
        let raw = uid.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CalendarDomainError::EmptyObjectUid);
        }

        Ok(Self {
            uid: trimmed.to_owned(),
            period: None,
            properties: Map::new(),
        })
    }

    /// Sets the time bounds.
    #[must_use]
    pub const fn with_period(mut self, period: TimePeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Returns the UID identifying this object within its calendar.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Returns the time bounds, if the object has any.
    #[must_use]
    pub const fn period(&self) -> Option<TimePeriod> {
        self.period
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

    /// Applies an edit payload: time bounds when supplied and a property
    /// merge. The UID is identity and is never changed by edits.
    pub fn apply(&mut self, data: &ObjectData) {
        if let Some(period) = data.period() {
            self.period = Some(period);
        }
        for (name, value) in data.properties() {
            self.properties.insert(name.clone(), value.clone());
        }
    }

    /// Records the derived composite identifier under
    /// [`Self::ID_PROPERTY`].
    #[must_use]
    pub fn tagged(mut self, id: &ObjectId) -> Self {
        self.properties
            .insert(Self::ID_PROPERTY.to_owned(), Value::String(id.to_string()));
        self
    }

    /// Converts the object into a creation payload carrying the same UID,
    /// bounds, and properties, minus the derived identifier decoration.
    ///
    /// Used by the move emulation to recreate an object in another
    /// calendar.
    #[must_use]
    pub fn as_data(&self) -> ObjectData {
        let mut properties = self.properties.clone();
        properties.remove(Self::ID_PROPERTY);

        let mut data = ObjectData::new().with_uid(self.uid.clone());
        if let Some(period) = self.period {
            data = data.with_period(period);
        }
        for (name, value) in properties {
            data = data.with_property(name, value);
        }
        data
    }
}

/// Creation/edit payload for calendar objects.
///
/// Every field is optional: creation fills in defaults (a generated UID)
/// and edits only touch the supplied fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    uid: Option<String>,
    period: Option<TimePeriod>,
    properties: Map<String, Value>,
}

impl ObjectData {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the UID to create the object under.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Sets the time bounds.
    #[must_use]
    pub const fn with_period(mut self, period: TimePeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Returns the requested UID, if any.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Returns the requested time bounds, if any.
    #[must_use]
    pub const fn period(&self) -> Option<TimePeriod> {
        self.period
    }

    /// Returns the properties to set.
    #[must_use]
    pub const fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

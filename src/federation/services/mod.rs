//! Application services for the calendar federation layer.

mod capability;
mod dispatcher;
mod merge;
mod registry;

pub use capability::Negotiation;
pub use dispatcher::{
    CalendarFederationService, CalendarFilter, FederationError, FederationResult,
};
pub use merge::{CalendarMergeService, MergeReport, MergeStrategy, SourceMergeOutcome};
pub use registry::{
    BackendFactory, BackendRegistry, RegistryError, RegistryResult, SetupReport,
    SkippedDescriptor,
};

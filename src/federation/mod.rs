//! Calendar federation across pluggable storage backends.
//!
//! This module lets a calendaring application address calendars and
//! calendar objects stored across independently implemented backends
//! through one uniform API and one uniform identifier scheme
//! (`backend.calendar[.object]`). The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

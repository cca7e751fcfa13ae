//! Almanac: calendar federation across pluggable storage backends.
//!
//! This crate lets a calendaring application address calendars and
//! calendar objects (events, journals, to-dos) stored across multiple,
//! independently implemented storage backends through one uniform API and
//! one uniform identifier scheme. Client code never talks to a backend
//! directly; it talks to the federation services, which resolve a flat
//! `backend.calendar[.object]` identifier to the owning backend and
//! dispatch the operation, adapting to whatever subset of operations the
//! backend actually supports.
//!
//! # Architecture
//!
//! Almanac follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and validation with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for backends, caching, and
//!   logging
//! - **Adapters**: Concrete implementations of ports (in-memory, tracing)
//! - **Services**: The registry, dispatcher, and merge engine
//!
//! # Modules
//!
//! - [`federation`]: Backend registry, identifier codec, capability
//!   negotiation, dispatch, and merge/move emulation

pub mod federation;

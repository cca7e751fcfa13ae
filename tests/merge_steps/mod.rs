//! Step definitions for calendar merge behaviour scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;

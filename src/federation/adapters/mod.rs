//! Adapter implementations of the federation ports.

pub mod memory;
pub mod tracing_log;

pub use tracing_log::TracingOperationLog;

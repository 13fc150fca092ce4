//! Long-running services.
//!
//! - [`Coordinator`]: owns the controller connection and the zone table

pub mod coordinator;

pub use coordinator::Coordinator;

//! Pipeline module - loading, statistics and artifact storage for a report run

pub mod artifacts;
pub mod correlation;
pub mod distribution;
pub mod loader;

pub use artifacts::*;
pub use correlation::*;
pub use distribution::*;
pub use loader::*;

//! Report module - chart styling, rendering and artifact generation

pub mod analytics;
pub mod generator;
pub mod render;
pub mod style;
pub mod summary;

pub use analytics::*;
pub use generator::*;
pub use render::*;
pub use style::*;
pub use summary::*;

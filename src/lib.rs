//! Vino Veritas: wine-quality reporting library
//!
//! Loads a wine chemistry dataset, renders per-feature distribution charts, a
//! target distribution chart and a correlation heatmap, fits a linear quality
//! model, and serves predictions plus the charts over HTTP.

pub mod cli;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod utils;

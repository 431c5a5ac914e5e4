//! CLI module - argument parsing and the three run modes

mod args;
pub mod logging;
pub mod report;
pub mod serve;
pub mod train;

pub use args::{Cli, Commands};
pub use report::run_report;
pub use serve::run_serve;
pub use train::run_train;

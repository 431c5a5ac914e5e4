//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::DEFAULT_MODEL_PATH;
use crate::pipeline::{DEFAULT_DATASET, DEFAULT_PLOTS_DIR, DEFAULT_TARGET};
use crate::report::DEFAULT_ANALYTICS_PATH;

/// Vino Veritas - Wine-quality report charts and prediction API.
///
/// Without a subcommand, reads the dataset and regenerates every chart.
#[derive(Parser, Debug)]
#[command(name = "vinoveritas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input dataset (CSV or Parquet)
    #[arg(short, long, default_value = DEFAULT_DATASET)]
    pub input: PathBuf,

    /// Target column (the quality score)
    #[arg(short, long, default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Directory receiving the chart images
    #[arg(short, long, default_value = DEFAULT_PLOTS_DIR)]
    pub output_dir: PathBuf,

    /// Where to write the analytics summary consumed by the dashboard routes
    #[arg(long, default_value = DEFAULT_ANALYTICS_PATH)]
    pub analytics: PathBuf,

    /// JSON chart style overriding the built-in look
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the quality model and write it as JSON
    Train {
        /// Input dataset (CSV or Parquet)
        #[arg(short, long, default_value = DEFAULT_DATASET)]
        input: PathBuf,

        /// Target column (the quality score)
        #[arg(short, long, default_value = DEFAULT_TARGET)]
        target: String,

        /// Model file to write
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,

        /// Number of rows to use for schema inference (CSV only)
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Serve the prediction API and the chart images
    Serve {
        /// Address to bind
        #[arg(long, env = "VINO_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, env = "VINO_PORT", default_value = "8001", value_parser = validate_port)]
        port: u16,

        /// Model file produced by `train`
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Analytics summary produced by a report run
        #[arg(long, default_value = DEFAULT_ANALYTICS_PATH)]
        analytics: PathBuf,

        /// Directory served under /static/plots
        #[arg(long, default_value = DEFAULT_PLOTS_DIR)]
        plots_dir: PathBuf,
    },
}

/// Validator for the port parameter
fn validate_port(s: &str) -> Result<u16, String> {
    let value: u16 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid port", s))?;

    if value == 0 {
        Err("port must be between 1 and 65535".to_string())
    } else {
        Ok(value)
    }
}

//! Error types for the report pipeline and model files.
//!
//! Each batch-stage failure has its own enum so the CLI can tell a bad dataset
//! apart from a filesystem problem or a rendering precondition. HTTP-layer
//! errors live in [`crate::server::ApiError`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a dataset into a [`crate::pipeline::FeatureTable`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dataset file does not exist.
    #[error("Dataset not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file extension is not one the loader understands.
    #[error("Unsupported file format: '{extension}'. Supported formats: csv, parquet")]
    UnsupportedFormat { extension: String },

    /// The file exists but could not be parsed as a table.
    #[error("Failed to read dataset {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// The table parsed but holds no data rows.
    #[error("Dataset {} contains no rows", path.display())]
    Empty { path: PathBuf },

    /// The configured target column is absent from the header.
    #[error("Target column '{target}' not found. Available columns: {available:?}")]
    MissingTarget {
        target: String,
        available: Vec<String>,
    },

    /// The target column exists but is not numeric.
    #[error("Target column '{target}' must be numeric, found {dtype}")]
    NonNumericTarget { target: String, dtype: String },
}

/// Errors raised while creating the artifact directory or writing into it.
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("Failed to create artifact directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write artifact {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the report generator.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The correlation heatmap needs at least two numeric columns.
    #[error("Correlation matrix needs at least 2 numeric columns, found {found}")]
    InsufficientColumns { found: usize },

    /// A column selected for rendering has no non-null values.
    #[error("Column '{column}' has no values to summarize")]
    EmptyColumn { column: String },

    /// A column could not be read as floating point values.
    #[error("Column '{column}' could not be read as numbers: {message}")]
    Column { column: String, message: String },

    /// The rendering backend failed to produce an image.
    #[error("Failed to render {artifact}: {message}")]
    Render { artifact: String, message: String },

    /// A chart style file is unreadable or holds invalid values.
    #[error("Invalid chart style: {0}")]
    Style(String),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Errors raised while fitting, saving, or loading a model file.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model needs at least one feature column")]
    NoFeatures,

    #[error("Model needs more complete rows ({rows}) than features ({features})")]
    NotEnoughRows { rows: usize, features: usize },

    #[error("Normal equations could not be solved: coefficients are not finite")]
    Singular,

    #[error("Failed to read model file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write model file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Model file is inconsistent: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Report(#[from] ReportError),
}

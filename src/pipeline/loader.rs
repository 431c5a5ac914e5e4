//! Dataset loader for CSV and Parquet files

use std::path::Path;

use polars::prelude::*;

use crate::error::LoadError;

/// Default dataset read by the report run when no input is given.
pub const DEFAULT_DATASET: &str = "winequality-red_par.csv";

/// Default name of the ordinal target column.
pub const DEFAULT_TARGET: &str = "quality";

/// A loaded dataset: named columns plus exactly one numeric target column.
///
/// The table is read-only once built. Feature columns are the numeric columns
/// other than the target, in header order.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    df: DataFrame,
    target: String,
}

impl FeatureTable {
    /// Wrap a DataFrame, checking that `target` exists and is numeric.
    pub fn new(df: DataFrame, target: &str) -> Result<Self, LoadError> {
        let column = df.column(target).map_err(|_| LoadError::MissingTarget {
            target: target.to_string(),
            available: df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })?;

        if !column.dtype().is_primitive_numeric() {
            return Err(LoadError::NonNumericTarget {
                target: target.to_string(),
                dtype: column.dtype().to_string(),
            });
        }

        Ok(Self {
            df,
            target: target.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// All numeric column names (features and target) in header order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| col.dtype().is_primitive_numeric())
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Numeric column names excluding the target.
    pub fn feature_columns(&self) -> Vec<String> {
        self.numeric_columns()
            .into_iter()
            .filter(|name| name != &self.target)
            .collect()
    }

    /// Column values cast to f64, nulls preserved as `None`.
    pub fn column_values(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let float_col = self.df.column(name)?.cast(&DataType::Float64)?;
        Ok(float_col.f64()?.iter().collect())
    }

    /// Non-null column values cast to f64.
    pub fn non_null_values(&self, name: &str) -> PolarsResult<Vec<f64>> {
        Ok(self
            .column_values(name)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }
}

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let parse_err = |source: PolarsError| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(schema_length)
            .finish()
            .map_err(parse_err)?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default()).map_err(parse_err)?,
        _ => return Err(LoadError::UnsupportedFormat { extension }),
    };

    let df = lf.collect().map_err(parse_err)?;

    if df.height() == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(df)
}

/// Parse an in-memory CSV document with a header row.
pub fn read_csv_bytes(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(std::io::Cursor::new(bytes))
        .finish()
}

/// Load a dataset and wrap it as a [`FeatureTable`] keyed on `target`.
pub fn load_feature_table(
    path: &Path,
    target: &str,
    infer_schema_length: usize,
) -> Result<FeatureTable, LoadError> {
    let df = load_dataset(path, infer_schema_length)?;
    FeatureTable::new(df, target)
}

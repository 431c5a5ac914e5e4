//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;

use polars::prelude::*;
use tempfile::TempDir;

use vinoveritas::error::ReportError;
use vinoveritas::model::LinearModel;
use vinoveritas::pipeline::{CorrelationMatrix, FeatureTable};
use vinoveritas::report::{ChartStyle, HistogramChart, Renderer};

pub const WINE_FEATURES: [&str; 4] = ["fixed acidity", "volatile acidity", "pH", "alcohol"];

/// A small wine-like table with known structure.
///
/// - `quality` = 0.5 * alcohol - 3 * volatile acidity + 1.6, always an integer
/// - `alcohol` and `volatile acidity` are uncorrelated over the 40 rows
/// - `fixed acidity` is strongly tied to `pH` (negatively) and has no effect on quality
/// - no nulls
pub fn create_wine_dataframe() -> DataFrame {
    let n = 40;
    let alcohol: Vec<f64> = (0..n).map(|i| 8.0 + (i % 5) as f64 * 2.0).collect();
    let volatile: Vec<f64> = (0..n).map(|i| 0.2 + ((i * 7) % 4) as f64 / 3.0).collect();
    let fixed: Vec<f64> = (0..n).map(|i| 6.0 + ((i * 3) % 13) as f64 * 0.4).collect();
    let ph: Vec<f64> = fixed
        .iter()
        .enumerate()
        .map(|(i, f)| 4.4 - 0.1 * f + (i % 3) as f64 * 0.01)
        .collect();
    let quality: Vec<i64> = alcohol
        .iter()
        .zip(&volatile)
        .map(|(a, v)| (0.5 * a - 3.0 * v + 1.6).round() as i64)
        .collect();

    df! {
        "fixed acidity" => fixed,
        "volatile acidity" => volatile,
        "pH" => ph,
        "alcohol" => alcohol,
        "quality" => quality,
    }
    .unwrap()
}

/// Wine table where `quality` is an exact linear function of the features.
pub fn create_linear_dataframe() -> DataFrame {
    let n = 60;
    let a: Vec<f64> = (0..n).map(|i| i as f64 * 0.25).collect();
    let b: Vec<f64> = (0..n).map(|i| ((i * 17) % 23) as f64).collect();
    let y: Vec<f64> = a.iter().zip(&b).map(|(a, b)| 2.0 + 1.5 * a - 0.25 * b).collect();
    df! {
        "alcohol" => a,
        "sulphates" => b,
        "quality" => y,
    }
    .unwrap()
}

/// Create a larger random table for stress tests
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let mut columns: Vec<Column> = Vec::with_capacity(cols + 1);
    for i in 0..cols {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }
    let target: Vec<i64> = (0..rows).map(|_| rng.gen_range(3..9)).collect();
    columns.push(Column::new("quality".into(), target));

    DataFrame::new(columns).unwrap()
}

pub fn wine_table() -> FeatureTable {
    FeatureTable::new(create_wine_dataframe(), "quality").unwrap()
}

/// Model fitted on [`create_wine_dataframe`].
pub fn wine_model() -> LinearModel {
    LinearModel::fit(&wine_table()).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("winequality-red_par.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("winequality-red_par.parquet");

    let mut file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Renderer that records what it was asked to draw and returns a stub image.
///
/// Keeps report tests independent of fonts available on the machine.
#[derive(Default)]
pub struct RecordingRenderer {
    pub titles: RefCell<Vec<String>>,
    pub heatmap_columns: RefCell<Vec<String>>,
}

pub const STUB_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nstub";

impl Renderer for RecordingRenderer {
    fn histogram(&self, chart: &HistogramChart<'_>, _style: &ChartStyle) -> Result<Vec<u8>, ReportError> {
        self.titles.borrow_mut().push(chart.title.clone());
        Ok(STUB_IMAGE.to_vec())
    }

    fn heatmap(
        &self,
        matrix: &CorrelationMatrix,
        title: &str,
        _style: &ChartStyle,
    ) -> Result<Vec<u8>, ReportError> {
        self.titles.borrow_mut().push(title.to_string());
        *self.heatmap_columns.borrow_mut() = matrix.columns.clone();
        Ok(STUB_IMAGE.to_vec())
    }
}

/// Renderer whose heatmap always fails, to check partial-run behaviour.
pub struct FailingHeatmapRenderer;

impl Renderer for FailingHeatmapRenderer {
    fn histogram(&self, _chart: &HistogramChart<'_>, _style: &ChartStyle) -> Result<Vec<u8>, ReportError> {
        Ok(STUB_IMAGE.to_vec())
    }

    fn heatmap(
        &self,
        _matrix: &CorrelationMatrix,
        _title: &str,
        _style: &ChartStyle,
    ) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Render {
            artifact: "correlation_matrix.png".to_string(),
            message: "backend unavailable".to_string(),
        })
    }
}

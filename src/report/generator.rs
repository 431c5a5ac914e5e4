//! Report generation: Feature Table -> distribution, target and correlation images
//!
//! A run is a full regeneration. Statistics and the correlation matrix are all
//! computed first, so a precondition failure leaves the artifact directory
//! untouched; after that every image is rendered and written in turn,
//! overwriting older files of the same name.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ReportError;
use crate::pipeline::{
    correlation_matrix, density_curve, ensure_artifact_dir, value_counts, write_artifact,
    ColumnStats, CorrelationMatrix, FeatureTable, Histogram, ValueCount,
};
use crate::report::render::{HistogramChart, Renderer};
use crate::report::style::{title_case, ChartStyle};

/// Filename of the target distribution chart.
pub const QUALITY_DISTRIBUTION_FILE: &str = "quality_distribution.png";

/// Filename of the correlation heatmap.
pub const CORRELATION_MATRIX_FILE: &str = "correlation_matrix.png";

/// Prefix of every per-feature distribution chart.
pub const DISTRIBUTION_PREFIX: &str = "dist_";

/// `dist_<name>.png` with whitespace and path separators replaced by `_`.
/// Casing is preserved.
pub fn distribution_file_name(column: &str) -> String {
    let sanitized: String = column
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{DISTRIBUTION_PREFIX}{sanitized}.png")
}

/// Statistics for one feature column.
#[derive(Debug, Clone)]
pub struct FeatureDistribution {
    pub feature: String,
    pub stats: ColumnStats,
    pub histogram: Histogram,
    pub density: Vec<(f64, f64)>,
}

/// Every number a report run draws, computed up front.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub target: String,
    pub features: Vec<FeatureDistribution>,
    pub target_histogram: Histogram,
    pub target_counts: Vec<ValueCount>,
    pub correlation: CorrelationMatrix,
}

/// What kind of chart an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Distribution,
    TargetDistribution,
    Correlation,
}

/// One written image.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    pub name: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct ReportOutcome {
    pub data: ReportData,
    pub artifacts: Vec<ArtifactRecord>,
    pub elapsed: Duration,
}

impl ReportOutcome {
    pub fn artifact_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }
}

fn column_values(table: &FeatureTable, column: &str) -> Result<Vec<f64>, ReportError> {
    let values = table
        .non_null_values(column)
        .map_err(|e| ReportError::Column {
            column: column.to_string(),
            message: e.to_string(),
        })?;
    if values.is_empty() {
        return Err(ReportError::EmptyColumn {
            column: column.to_string(),
        });
    }
    Ok(values)
}

/// Compute all distributions and the correlation matrix for `table`.
pub fn compute_report_data(table: &FeatureTable, style: &ChartStyle) -> Result<ReportData, ReportError> {
    let correlation = correlation_matrix(table)?;

    let features = table
        .feature_columns()
        .into_iter()
        .map(|feature| {
            let values = column_values(table, &feature)?;
            let histogram = Histogram::from_values(&values, style.feature.bins)
                .ok_or_else(|| ReportError::EmptyColumn {
                    column: feature.clone(),
                })?;
            let density = if style.feature.density_overlay {
                density_curve(&values, &histogram)
            } else {
                Vec::new()
            };
            let stats = ColumnStats::from_values(&values).ok_or_else(|| ReportError::EmptyColumn {
                column: feature.clone(),
            })?;
            Ok(FeatureDistribution {
                feature,
                stats,
                histogram,
                density,
            })
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    let target_values = column_values(table, table.target())?;
    let target_histogram = Histogram::from_values(&target_values, style.target.bins).ok_or_else(|| {
        ReportError::EmptyColumn {
            column: table.target().to_string(),
        }
    })?;

    Ok(ReportData {
        target: table.target().to_string(),
        features,
        target_histogram,
        target_counts: value_counts(&target_values),
        correlation,
    })
}

/// Drives one report run against a renderer and an output directory.
pub struct ReportGenerator<'a, R: Renderer + ?Sized> {
    renderer: &'a R,
    style: &'a ChartStyle,
    output_dir: &'a Path,
}

impl<'a, R: Renderer + ?Sized> ReportGenerator<'a, R> {
    pub fn new(renderer: &'a R, style: &'a ChartStyle, output_dir: &'a Path) -> Self {
        Self {
            renderer,
            style,
            output_dir,
        }
    }

    /// Generate and write all N + 2 artifacts for `table`.
    pub fn generate(&self, table: &FeatureTable) -> Result<ReportOutcome, ReportError> {
        self.generate_with(table, |_| {})
    }

    /// Like [`generate`](Self::generate), calling `on_written` after each file lands.
    pub fn generate_with<F>(&self, table: &FeatureTable, mut on_written: F) -> Result<ReportOutcome, ReportError>
    where
        F: FnMut(&ArtifactRecord),
    {
        let start = Instant::now();
        let data = compute_report_data(table, self.style)?;

        ensure_artifact_dir(self.output_dir)?;

        let mut artifacts = Vec::with_capacity(data.features.len() + 2);
        let labels = &self.style.labels;

        for dist in &data.features {
            let name = title_case(&dist.feature);
            let chart = HistogramChart {
                title: labels.feature_title.replace("{name}", &name),
                x_label: labels.feature_x.replace("{name}", &name),
                y_label: labels.feature_y.replace("{name}", &name),
                histogram: &dist.histogram,
                density: &dist.density,
                look: &self.style.feature,
            };
            let bytes = self.renderer.histogram(&chart, self.style)?;
            let record = self.write(distribution_file_name(&dist.feature), ArtifactKind::Distribution, &bytes)?;
            on_written(&record);
            artifacts.push(record);
        }

        let target_name = title_case(&data.target);
        let chart = HistogramChart {
            title: labels.target_title.replace("{name}", &target_name),
            x_label: labels.target_x.replace("{name}", &target_name),
            y_label: labels.target_y.replace("{name}", &target_name),
            histogram: &data.target_histogram,
            density: &[],
            look: &self.style.target,
        };
        let bytes = self.renderer.histogram(&chart, self.style)?;
        let record = self.write(
            QUALITY_DISTRIBUTION_FILE.to_string(),
            ArtifactKind::TargetDistribution,
            &bytes,
        )?;
        on_written(&record);
        artifacts.push(record);

        let bytes = self
            .renderer
            .heatmap(&data.correlation, &labels.heatmap_title, self.style)?;
        let record = self.write(CORRELATION_MATRIX_FILE.to_string(), ArtifactKind::Correlation, &bytes)?;
        on_written(&record);
        artifacts.push(record);

        Ok(ReportOutcome {
            data,
            artifacts,
            elapsed: start.elapsed(),
        })
    }

    fn write(&self, name: String, kind: ArtifactKind, bytes: &[u8]) -> Result<ArtifactRecord, ReportError> {
        let path = write_artifact(self.output_dir, &name, bytes)?;
        debug!(artifact = %name, bytes = bytes.len(), "wrote artifact");
        Ok(ArtifactRecord {
            name,
            kind,
            path,
            bytes: bytes.len(),
        })
    }
}

//! Analytics summary export
//!
//! A report run also writes the numbers behind its charts as JSON so the
//! dashboard can draw interactive versions without reloading the dataset.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::pipeline::{CorrelationNode, ValueCount};
use crate::report::generator::{FeatureDistribution, ReportData};

/// Default location of the analytics summary, next to the plots directory.
pub const DEFAULT_ANALYTICS_PATH: &str = "static/analytics.json";

/// Metadata about the report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Crate version that produced the file
    pub version: String,
    /// Input file path
    pub input_file: String,
    /// Target column name
    pub target_column: String,
    /// Number of rows in the dataset
    pub rows: usize,
}

/// One feature's histogram, density curve and summary statistics.
///
/// `bins` holds the bin edges, one more than `counts`; the dashboard labels
/// bar `i` with `bins[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub counts: Vec<usize>,
    pub bins: Vec<f64>,
    /// Count-scaled density curve, empty when the overlay is disabled.
    pub kde_x: Vec<f64>,
    pub kde_y: Vec<f64>,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&FeatureDistribution> for DistributionEntry {
    fn from(dist: &FeatureDistribution) -> Self {
        let bins = &dist.histogram.bins;
        let edges = bins
            .iter()
            .map(|b| b.start)
            .chain(bins.last().map(|b| b.end))
            .collect();
        Self {
            counts: bins.iter().map(|b| b.count).collect(),
            bins: edges,
            kde_x: dist.density.iter().map(|(x, _)| *x).collect(),
            kde_y: dist.density.iter().map(|(_, y)| *y).collect(),
            mean: dist.stats.mean,
            std: dist.stats.std,
            min: dist.stats.min,
            max: dist.stats.max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationCell {
    pub x: String,
    pub y: String,
    /// `null` where the coefficient is undefined
    pub value: Option<f64>,
}

impl From<CorrelationNode> for CorrelationCell {
    fn from(node: CorrelationNode) -> Self {
        Self {
            x: node.x,
            y: node.y,
            value: node.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationExport {
    pub features: Vec<String>,
    pub nodes: Vec<CorrelationCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityCount {
    pub quality: f64,
    pub count: usize,
}

impl From<&ValueCount> for QualityCount {
    fn from(vc: &ValueCount) -> Self {
        Self {
            quality: vc.quality,
            count: vc.count,
        }
    }
}

/// Complete analytics export with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub metadata: AnalyticsMetadata,
    pub correlation: CorrelationExport,
    /// Keyed by feature name.
    pub distributions: BTreeMap<String, DistributionEntry>,
    pub quality_distribution: Vec<QualityCount>,
}

impl AnalyticsSummary {
    /// Build the export from a run's computed data.
    pub fn from_report(data: &ReportData, input_file: &str, rows: usize) -> Self {
        let distributions = data
            .features
            .iter()
            .map(|d| (d.feature.clone(), DistributionEntry::from(d)))
            .collect();

        Self {
            metadata: AnalyticsMetadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.to_string(),
                target_column: data.target.clone(),
                rows,
            },
            correlation: CorrelationExport {
                features: data.correlation.columns.clone(),
                nodes: data
                    .correlation
                    .nodes()
                    .into_iter()
                    .map(CorrelationCell::from)
                    .collect(),
            },
            distributions,
            quality_distribution: data.target_counts.iter().map(QualityCount::from).collect(),
        }
    }

    /// Write the summary as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize analytics summary to JSON")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write analytics summary to {}", path.display()))?;

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analytics summary {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Malformed analytics summary {}", path.display()))
    }
}

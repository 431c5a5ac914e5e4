//! Ordinary least squares on standardized features.
//!
//! Fitting solves the normal equations `(ZᵀZ + λI) β = Zᵀ(y - ȳ)` for the
//! standardized design matrix `Z`, then maps β back to raw-scale coefficients.
//! The small ridge term keeps the system solvable when features are collinear
//! or constant. Importance is `|β_j| / Σ|β|`.

use std::path::Path;

use chrono::Utc;
use faer::prelude::SpSolver;
use faer::Mat;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ReportError};
use crate::model::{FeatureImportance, Predictor};
use crate::pipeline::FeatureTable;

const RIDGE: f64 = 1e-8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: String,
    pub version: String,
    /// Complete rows used for fitting
    pub rows: usize,
    /// Coefficient of determination on the training rows
    pub r_squared: f64,
}

/// Linear model persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub metadata: ModelMetadata,
    pub target: String,
    pub features: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub importances: Vec<FeatureImportance>,
}

impl LinearModel {
    /// Fit on every feature column of `table` against its target.
    ///
    /// Rows with a null in any feature or the target are skipped.
    pub fn fit(table: &FeatureTable) -> Result<Self, ModelError> {
        let features = table.feature_columns();
        if features.is_empty() {
            return Err(ModelError::NoFeatures);
        }

        let read = |name: &str| {
            table.column_values(name).map_err(|e| ReportError::Column {
                column: name.to_string(),
                message: e.to_string(),
            })
        };
        let columns = features
            .iter()
            .map(|name| read(name))
            .collect::<Result<Vec<_>, _>>()?;
        let target = read(table.target())?;

        // Keep complete rows only
        let rows: Vec<(Vec<f64>, f64)> = (0..table.height())
            .filter_map(|r| {
                let y = target[r].filter(|v| v.is_finite())?;
                let x = columns
                    .iter()
                    .map(|c| c[r].filter(|v| v.is_finite()))
                    .collect::<Option<Vec<f64>>>()?;
                Some((x, y))
            })
            .collect();

        Self::fit_rows(table.target(), features, &rows)
    }

    /// Fit from already-extracted complete rows.
    pub fn fit_rows(
        target: &str,
        features: Vec<String>,
        rows: &[(Vec<f64>, f64)],
    ) -> Result<Self, ModelError> {
        let p = features.len();
        let n = rows.len();
        if p == 0 {
            return Err(ModelError::NoFeatures);
        }
        if n <= p {
            return Err(ModelError::NotEnoughRows { rows: n, features: p });
        }

        let nf = n as f64;
        let y_mean = rows.iter().map(|(_, y)| y).sum::<f64>() / nf;
        let means: Vec<f64> = (0..p)
            .map(|j| rows.iter().map(|(x, _)| x[j]).sum::<f64>() / nf)
            .collect();
        let stds: Vec<f64> = (0..p)
            .map(|j| {
                let var = rows.iter().map(|(x, _)| (x[j] - means[j]).powi(2)).sum::<f64>() / nf;
                let std = var.sqrt();
                // Constant columns keep a unit scale and end up with β ≈ 0
                if std > 0.0 {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        let z = Mat::<f64>::from_fn(n, p, |i, j| (rows[i].0[j] - means[j]) / stds[j]);
        let yc = Mat::<f64>::from_fn(n, 1, |i, _| rows[i].1 - y_mean);

        let mut gram = z.transpose() * &z;
        for j in 0..p {
            gram[(j, j)] += RIDGE * nf;
        }
        let rhs = z.transpose() * &yc;
        let beta = gram.partial_piv_lu().solve(rhs.as_ref());

        let beta: Vec<f64> = (0..p).map(|j| beta[(j, 0)]).collect();
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(ModelError::Singular);
        }

        let coefficients: Vec<f64> = beta.iter().zip(&stds).map(|(b, s)| b / s).collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        let total: f64 = beta.iter().map(|b| b.abs()).sum();
        let mut importances: Vec<FeatureImportance> = features
            .iter()
            .zip(&beta)
            .map(|(f, b)| FeatureImportance {
                feature: f.clone(),
                importance: if total > 0.0 { b.abs() / total } else { 1.0 / p as f64 },
            })
            .collect();
        importances.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut model = Self {
            metadata: ModelMetadata {
                trained_at: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                rows: n,
                r_squared: 0.0,
            },
            target: target.to_string(),
            features,
            means,
            stds,
            coefficients,
            intercept,
            importances,
        };

        let ss_tot: f64 = rows.iter().map(|(_, y)| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = rows
            .iter()
            .map(|(x, y)| (y - model.predict(x)).powi(2))
            .sum();
        model.metadata.r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(model)
    }

    /// Check that the per-feature vectors line up.
    pub fn validate(&self) -> Result<(), ModelError> {
        let p = self.features.len();
        if p == 0 {
            return Err(ModelError::NoFeatures);
        }
        for (name, len) in [
            ("means", self.means.len()),
            ("stds", self.stds.len()),
            ("coefficients", self.coefficients.len()),
        ] {
            if len != p {
                return Err(ModelError::Inconsistent(format!(
                    "{name} has {len} entries for {p} features"
                )));
            }
        }
        if self.importances.is_empty() {
            return Err(ModelError::Inconsistent("importance table is empty".to_string()));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ModelError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| ModelError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: LinearModel = serde_json::from_str(&text)?;
        model.validate()?;
        Ok(model)
    }
}

impl Predictor for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn importances(&self) -> Vec<FeatureImportance> {
        self.importances.clone()
    }
}

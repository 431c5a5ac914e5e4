//! Full pairwise Pearson correlation matrix over numeric columns

use rayon::prelude::*;
use serde::Serialize;

use crate::error::ReportError;
use crate::pipeline::FeatureTable;

/// Square, symmetric correlation matrix with named rows/columns.
///
/// `values[i][j] == values[j][i]` and the diagonal is exactly 1.0. Pairs where
/// either column has no variance hold NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// One cell of the matrix in the shape the dashboard consumes.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationNode {
    pub x: String,
    pub y: String,
    pub value: Option<f64>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Coefficient between two named columns.
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Every cell as `(x, y, value)`, row-major; NaN becomes `None`.
    pub fn nodes(&self) -> Vec<CorrelationNode> {
        let mut nodes = Vec::with_capacity(self.len() * self.len());
        for (i, x) in self.columns.iter().enumerate() {
            for (j, y) in self.columns.iter().enumerate() {
                let v = self.values[i][j];
                nodes.push(CorrelationNode {
                    x: x.clone(),
                    y: y.clone(),
                    value: if v.is_nan() { None } else { Some(v) },
                });
            }
        }
        nodes
    }
}

/// Compute the correlation matrix over every numeric column of the table,
/// target included, in header order.
///
/// Fails with [`ReportError::InsufficientColumns`] when fewer than two numeric
/// columns exist.
pub fn correlation_matrix(table: &FeatureTable) -> Result<CorrelationMatrix, ReportError> {
    let names = table.numeric_columns();
    if names.len() < 2 {
        return Err(ReportError::InsufficientColumns { found: names.len() });
    }

    let columns: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| {
            table
                .column_values(name)
                .map_err(|e| ReportError::Column {
                    column: name.clone(),
                    message: e.to_string(),
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(correlation_from_columns(names, &columns))
}

/// Build the matrix from already-extracted columns of equal length.
pub fn correlation_from_columns(names: Vec<String>, columns: &[Vec<Option<f64>>]) -> CorrelationMatrix {
    let n = names.len();

    // Upper triangle only, mirrored afterwards
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    let coefficients: Vec<((usize, usize), f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let corr = compute_pearson_correlation(&columns[i], &columns[j]).unwrap_or(f64::NAN);
            ((i, j), corr)
        })
        .collect();

    let mut values = vec![vec![0.0; n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    for ((i, j), corr) in coefficients {
        values[i][j] = corr;
        values[j][i] = corr;
    }

    CorrelationMatrix {
        columns: names,
        values,
    }
}

/// Pearson correlation over rows where both values are present, using
/// Welford's single-pass update for numerical stability.
fn compute_pearson_correlation(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        if let (Some(x), Some(y)) = (*x, *y) {
            if x.is_nan() || y.is_nan() {
                continue;
            }
            n += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if n < 2.0 || var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

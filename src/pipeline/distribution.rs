//! Per-column distribution summaries: fixed-width histograms, a Gaussian
//! density overlay, and discrete value counts.

use std::collections::BTreeMap;

use serde::Serialize;

/// Number of bins used for feature distributions.
pub const FEATURE_BINS: usize = 30;

/// Number of bins used for the target distribution.
pub const TARGET_BINS: usize = 6;

/// Points sampled along the x range for the density curve.
const DENSITY_POINTS: usize = 200;

/// One histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Fixed-width histogram over the observed value range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Bin `values` into `bin_count` equal-width bins spanning `[min, max]`.
    ///
    /// A constant column is widened to `[v - 0.5, v + 0.5]`. Returns `None` when
    /// there are no values or `bin_count` is zero.
    pub fn from_values(values: &[f64], bin_count: usize) -> Option<Self> {
        if values.is_empty() || bin_count == 0 {
            return None;
        }

        let (mut lo, mut hi) = min_max(values)?;
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bin_count as f64;
        let mut counts = vec![0usize; bin_count];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bin_count - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: lo + width * i as f64,
                end: if i + 1 == bin_count {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count,
            })
            .collect();

        Some(Self { bins })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn bin_width(&self) -> f64 {
        self.bins.first().map(|b| b.end - b.start).unwrap_or(0.0)
    }

    /// Lower edge of the first bin and upper edge of the last.
    pub fn range(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 0.0),
        }
    }
}

/// Summary statistics reported next to each histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Sample statistics (n - 1 denominator), `None` on empty input.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (min, max) = min_max(values)?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Self {
            count: values.len(),
            mean,
            std,
            min,
            max,
        })
    }
}

/// Gaussian kernel density estimate evaluated over the histogram range,
/// scaled to counts so it overlays the bars.
///
/// Bandwidth follows Scott's rule (`std * n^(-1/5)`). Returns an empty curve
/// when the data has no spread.
pub fn density_curve(values: &[f64], histogram: &Histogram) -> Vec<(f64, f64)> {
    let Some(stats) = ColumnStats::from_values(values) else {
        return Vec::new();
    };
    if stats.std <= 0.0 || !stats.std.is_finite() {
        return Vec::new();
    }

    let n = values.len() as f64;
    let bandwidth = stats.std * n.powf(-0.2);
    let scale = n * histogram.bin_width();
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let (lo, hi) = histogram.range();
    let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;

    (0..DENSITY_POINTS)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}

/// Count of each distinct value, ordered by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub quality: f64,
    pub count: usize,
}

/// Count discrete target values. Values are compared exactly, which is what an
/// ordinal score column needs.
pub fn value_counts(values: &[f64]) -> Vec<ValueCount> {
    let mut counts: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for &v in values {
        // Order-preserving key for finite floats
        let bits = v.to_bits();
        let key = if v.is_sign_negative() { !bits } else { bits | (1 << 63) };
        counts.entry(key).or_insert((v, 0)).1 += 1;
    }
    counts
        .into_values()
        .map(|(quality, count)| ValueCount { quality, count })
        .collect()
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

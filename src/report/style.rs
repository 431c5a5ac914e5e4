//! Visual configuration for rendered charts.
//!
//! Every color, size and label used by the renderer lives here so a report
//! run is fully described by its data plus one `ChartStyle`. The defaults
//! reproduce the dashboard's high-contrast 300 DPI look.

use std::path::Path;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::pipeline::{FEATURE_BINS, TARGET_BINS};

/// Figure size in inches; pixel size is `inches * dpi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

/// Styling for one histogram family (feature distributions or the target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramStyle {
    /// Bar fill color, `#rrggbb`.
    pub bar_color: String,
    /// Bar fill opacity in `[0, 1]`.
    pub bar_alpha: f64,
    /// Number of equal-width bins.
    pub bins: usize,
    /// Draw the density curve over the bars.
    pub density_overlay: bool,
}

/// Fixed label strings. `{name}` in a template is replaced by the
/// title-cased column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLabels {
    pub feature_title: String,
    pub feature_x: String,
    pub feature_y: String,
    pub target_title: String,
    pub target_x: String,
    pub target_y: String,
    pub heatmap_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    /// Rasterization density; also scales every font size.
    pub dpi: u32,
    /// Canvas for feature and target histograms.
    pub histogram_figure: FigureSize,
    /// Canvas for the correlation heatmap.
    pub heatmap_figure: FigureSize,
    /// Font family handed to the text renderer.
    pub font_family: String,
    /// Request the bold face for every chart text. A family without an
    /// installed bold face renders at its regular weight instead.
    #[serde(default = "default_bold_text")]
    pub bold_text: bool,
    /// Sizes in points.
    pub title_size: f64,
    pub heatmap_title_size: f64,
    pub axis_label_size: f64,
    pub tick_label_size: f64,
    pub annotation_size: f64,
    /// Canvas fill.
    pub background: String,
    pub title_color: String,
    pub axis_label_color: String,
    pub tick_label_color: String,
    pub grid_color: String,
    /// Density curve stroke.
    pub density_color: String,
    pub feature: HistogramStyle,
    pub target: HistogramStyle,
    /// Diverging palette from -1 to +1, evenly spaced stops.
    pub heatmap_palette: Vec<String>,
    /// Gap between heatmap cells, in points.
    pub heatmap_cell_gap: f64,
    pub labels: ChartLabels,
}

fn default_bold_text() -> bool {
    true
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            dpi: 300,
            histogram_figure: FigureSize {
                width_in: 10.0,
                height_in: 8.0,
            },
            heatmap_figure: FigureSize {
                width_in: 16.0,
                height_in: 14.0,
            },
            font_family: "sans-serif".to_string(),
            bold_text: true,
            title_size: 24.0,
            heatmap_title_size: 28.0,
            axis_label_size: 18.0,
            tick_label_size: 14.0,
            annotation_size: 13.0,
            background: "#ffffff".to_string(),
            title_color: "#1a1a1a".to_string(),
            axis_label_color: "#333333".to_string(),
            tick_label_color: "#444444".to_string(),
            grid_color: "#e5e5e5".to_string(),
            density_color: "#800000".to_string(),
            feature: HistogramStyle {
                bar_color: "#800000".to_string(),
                bar_alpha: 0.7,
                bins: FEATURE_BINS,
                density_overlay: true,
            },
            target: HistogramStyle {
                bar_color: "#991b1b".to_string(),
                bar_alpha: 0.8,
                bins: TARGET_BINS,
                density_overlay: false,
            },
            // RdBu reversed: blue for negative, red for positive
            heatmap_palette: [
                "#053061", "#2166ac", "#4393c3", "#92c5de", "#d1e5f0", "#f7f7f7", "#fddbc7",
                "#f4a582", "#d6604d", "#b2182b", "#67001f",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            heatmap_cell_gap: 1.0,
            labels: ChartLabels {
                feature_title: "{name} Profile".to_string(),
                feature_x: "{name}".to_string(),
                feature_y: "Scientific Batch Frequency".to_string(),
                target_title: "Final Quality Yield Analysis".to_string(),
                target_x: "Quality Rating (Enological Scale)".to_string(),
                target_y: "Vat Count".to_string(),
                heatmap_title: "Global Chemical Dependency Matrix (Full Sample Set)".to_string(),
            },
        }
    }
}

impl ChartStyle {
    /// Load a style from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Style(format!("{}: {}", path.display(), e)))?;
        let style: ChartStyle = serde_json::from_str(&text)
            .map_err(|e| ReportError::Style(format!("{}: {}", path.display(), e)))?;
        style.validate()?;
        Ok(style)
    }

    /// Check ranges and that every color parses.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.dpi == 0 {
            return Err(ReportError::Style("dpi must be positive".to_string()));
        }
        for (name, fig) in [
            ("histogram_figure", self.histogram_figure),
            ("heatmap_figure", self.heatmap_figure),
        ] {
            if fig.width_in <= 0.0 || fig.height_in <= 0.0 {
                return Err(ReportError::Style(format!("{name} must have a positive size")));
            }
        }
        for hist in [&self.feature, &self.target] {
            if hist.bins == 0 {
                return Err(ReportError::Style("bin count must be positive".to_string()));
            }
            if !(0.0..=1.0).contains(&hist.bar_alpha) {
                return Err(ReportError::Style(format!(
                    "bar_alpha must be between 0.0 and 1.0, got {}",
                    hist.bar_alpha
                )));
            }
            parse_hex_color(&hist.bar_color)?;
        }
        self.palette()?;
        for color in [
            &self.background,
            &self.title_color,
            &self.axis_label_color,
            &self.tick_label_color,
            &self.grid_color,
            &self.density_color,
        ] {
            parse_hex_color(color)?;
        }
        Ok(())
    }

    /// Pixel dimensions of a figure at this style's DPI.
    pub fn pixels(&self, figure: FigureSize) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (figure.width_in * dpi).round().max(1.0) as u32,
            (figure.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Convert a point size to pixels at this style's DPI.
    pub fn font_px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    /// Parse the diverging palette once, ready for per-cell lookups.
    pub fn palette(&self) -> Result<HeatmapPalette, ReportError> {
        let stops = self
            .heatmap_palette
            .iter()
            .map(|c| parse_hex_color(c))
            .collect::<Result<Vec<_>, _>>()?;
        if stops.len() < 2 {
            return Err(ReportError::Style(
                "heatmap_palette needs at least 2 colors".to_string(),
            ));
        }
        Ok(HeatmapPalette { stops })
    }
}

/// Evenly spaced color stops spanning coefficients from -1 to +1.
#[derive(Debug, Clone)]
pub struct HeatmapPalette {
    stops: Vec<RGBColor>,
}

impl HeatmapPalette {
    /// Color for a coefficient in `[-1, 1]`. NaN maps to the midpoint.
    pub fn color(&self, value: f64) -> RGBColor {
        let v = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };

        let pos = (v + 1.0) / 2.0 * (self.stops.len() - 1) as f64;
        let lo = (pos.floor() as usize).min(self.stops.len() - 2);
        let t = pos - lo as f64;
        let (a, b) = (self.stops[lo], self.stops[lo + 1]);
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

/// Parse `#rrggbb` into a plotters color.
pub fn parse_hex_color(hex: &str) -> Result<RGBColor, ReportError> {
    let digits = hex
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| ReportError::Style(format!("'{hex}' is not a #rrggbb color")))?;
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    Ok(RGBColor(channel(0), channel(2), channel(4)))
}

/// `fixed_acidity` / `fixed acidity` -> `Fixed Acidity`.
pub fn title_case(column: &str) -> String {
    column
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

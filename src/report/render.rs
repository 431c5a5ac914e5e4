//! Chart rendering capability and its plotters-backed PNG implementation

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::error::ReportError;
use crate::pipeline::{CorrelationMatrix, Histogram};
use crate::report::style::{parse_hex_color, ChartStyle, HistogramStyle};

/// Everything needed to draw one histogram chart.
#[derive(Debug, Clone)]
pub struct HistogramChart<'a> {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub histogram: &'a Histogram,
    /// Count-scaled density curve, empty when there is no overlay.
    pub density: &'a [(f64, f64)],
    pub look: &'a HistogramStyle,
}

/// Turns summaries into encoded image bytes.
///
/// Implementations must be deterministic: the same inputs and style give the
/// same picture.
pub trait Renderer {
    /// Render a histogram chart.
    fn histogram(&self, chart: &HistogramChart<'_>, style: &ChartStyle) -> Result<Vec<u8>, ReportError>;

    /// Render an annotated correlation heatmap titled `title`.
    fn heatmap(
        &self,
        matrix: &CorrelationMatrix,
        title: &str,
        style: &ChartStyle,
    ) -> Result<Vec<u8>, ReportError>;
}

/// PNG renderer drawing with plotters onto an in-memory RGB buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlottersRenderer;

impl PlottersRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn render_err(artifact: &str) -> impl Fn(String) -> ReportError + '_ {
    move |message| ReportError::Render {
        artifact: artifact.to_string(),
        message,
    }
}

/// Encode a raw RGB buffer as PNG.
fn encode_png(buffer: Vec<u8>, width: u32, height: u32, artifact: &str) -> Result<Vec<u8>, ReportError> {
    let err = render_err(artifact);
    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| err("pixel buffer does not match image size".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| err(e.to_string()))?;
    Ok(out.into_inner())
}

/// Weight requested for every chart text.
fn text_weight(style: &ChartStyle) -> FontStyle {
    if style.bold_text {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    }
}

fn font<'a>(style: &'a ChartStyle, points: f64, color: &str) -> Result<TextStyle<'a>, ReportError> {
    let color = parse_hex_color(color)?;
    let desc = (style.font_family.as_str(), style.font_px(points))
        .into_font()
        .style(text_weight(style));
    Ok(desc.color(&color))
}

/// Margins around a square plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeatmapLayout {
    side: u32,
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

/// Fit the largest square plot into `width` x `height` after reserving
/// `label_area` below and to the left, centering what is left over.
fn heatmap_layout(width: u32, height: u32, label_area: u32, margin: u32) -> HeatmapLayout {
    let avail_w = width.saturating_sub(label_area + 2 * margin);
    let avail_h = height.saturating_sub(label_area + 2 * margin);
    let side = avail_w.min(avail_h);
    let (extra_w, extra_h) = (avail_w - side, avail_h - side);
    HeatmapLayout {
        side,
        left: margin + extra_w / 2,
        right: margin + extra_w - extra_w / 2,
        top: margin + extra_h / 2,
        bottom: margin + extra_h - extra_h / 2,
    }
}

impl Renderer for PlottersRenderer {
    fn histogram(&self, chart: &HistogramChart<'_>, style: &ChartStyle) -> Result<Vec<u8>, ReportError> {
        let (width, height) = style.pixels(style.histogram_figure);
        let err = render_err(&chart.title);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        let background = parse_hex_color(&style.background)?;
        let bar_color = parse_hex_color(&chart.look.bar_color)?;
        let density_color = parse_hex_color(&style.density_color)?;
        let grid_color = parse_hex_color(&style.grid_color)?;
        let title_font = font(style, style.title_size, &style.title_color)?;
        let axis_font = font(style, style.axis_label_size, &style.axis_label_color)?;
        let tick_font = font(style, style.tick_label_size, &style.tick_label_color)?;

        let (x_lo, x_hi) = chart.histogram.range();
        let peak = chart
            .density
            .iter()
            .map(|(_, y)| *y)
            .fold(chart.histogram.max_count() as f64, f64::max);
        let y_hi = (peak * 1.05).max(1.0);
        let margin = style.font_px(12.0) as u32;

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&background).map_err(|e| err(e.to_string()))?;

            let mut plot = ChartBuilder::on(&root)
                .caption(&chart.title, title_font)
                .margin(margin)
                .x_label_area_size(style.font_px(style.axis_label_size + style.tick_label_size) as u32 * 2)
                .y_label_area_size(style.font_px(style.axis_label_size + style.tick_label_size) as u32 * 3)
                .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)
                .map_err(|e| err(e.to_string()))?;

            plot.configure_mesh()
                .light_line_style(grid_color.mix(0.6))
                .bold_line_style(grid_color)
                .x_desc(chart.x_label.as_str())
                .y_desc(chart.y_label.as_str())
                .axis_desc_style(axis_font)
                .label_style(tick_font)
                .draw()
                .map_err(|e| err(e.to_string()))?;

            let fill = bar_color.mix(chart.look.bar_alpha).filled();
            let edge = ShapeStyle::from(&background).stroke_width(1);
            plot.draw_series(chart.histogram.bins.iter().map(|bin| {
                Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], fill)
            }))
            .map_err(|e| err(e.to_string()))?;
            plot.draw_series(chart.histogram.bins.iter().map(|bin| {
                Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], edge)
            }))
            .map_err(|e| err(e.to_string()))?;

            if !chart.density.is_empty() {
                let stroke = density_color.stroke_width((style.font_px(2.0)).max(1.0) as u32);
                plot.draw_series(LineSeries::new(chart.density.iter().copied(), stroke))
                    .map_err(|e| err(e.to_string()))?;
            }

            root.present().map_err(|e| err(e.to_string()))?;
        }

        encode_png(buffer, width, height, &chart.title)
    }

    fn heatmap(
        &self,
        matrix: &CorrelationMatrix,
        title: &str,
        style: &ChartStyle,
    ) -> Result<Vec<u8>, ReportError> {
        if matrix.len() < 2 {
            return Err(ReportError::InsufficientColumns { found: matrix.len() });
        }
        let (width, height) = style.pixels(style.heatmap_figure);
        let err = render_err(title);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        let n = matrix.len() as i32;
        let names = &matrix.columns;

        let background = parse_hex_color(&style.background)?;
        let palette = style.palette()?;
        let title_font = font(style, style.heatmap_title_size, &style.title_color)?;
        let tick_font = font(style, style.tick_label_size, &style.tick_label_color)?;
        let light_text = font(style, style.annotation_size, "#ffffff")?;
        let dark_text = font(style, style.annotation_size, &style.title_color)?;

        let cells: Vec<(usize, usize, f64, RGBColor)> = (0..matrix.len())
            .flat_map(|i| (0..matrix.len()).map(move |j| (i, j)))
            .map(|(i, j)| {
                let value = matrix.get(i, j);
                (i, j, value, palette.color(value))
            })
            .collect();
        let gap = style.font_px(style.heatmap_cell_gap).round() as i32;
        let label_pad = style.font_px(style.tick_label_size * 0.5).round() as u32;

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&background).map_err(|e| err(e.to_string()))?;

            let mut longest = 0u32;
            for name in names {
                let (w, _) = root
                    .estimate_text_size(name, &tick_font)
                    .map_err(|e| err(e.to_string()))?;
                longest = longest.max(w);
            }
            let label_area = longest + 2 * label_pad;

            let area = root.titled(title, title_font).map_err(|e| err(e.to_string()))?;
            let (area_w, area_h) = area.dim_in_pixel();
            let layout = heatmap_layout(area_w, area_h, label_area, style.font_px(16.0) as u32);
            debug!(side = layout.side, label_area, "heatmap plot area");

            let mut plot = ChartBuilder::on(&area)
                .margin_left(layout.left)
                .margin_right(layout.right)
                .margin_top(layout.top)
                .margin_bottom(layout.bottom)
                .x_label_area_size(label_area)
                .y_label_area_size(label_area)
                .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())
                .map_err(|e| err(e.to_string()))?;

            // Segment i spans [i, i + 1]; the last one ends at n. Row 0 is drawn at the top.
            let row_name = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(i) if *i >= 0 && *i < n => names[(n - 1 - i) as usize].clone(),
                _ => String::new(),
            };

            plot.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_labels(n as usize)
                .y_label_formatter(&row_name)
                .y_label_style(tick_font.clone())
                .draw()
                .map_err(|e| err(e.to_string()))?;

            plot.draw_series(cells.iter().map(|&(i, j, _, color)| {
                let (x, y) = (j as i32, n - 1 - i as i32);
                Rectangle::new(
                    [(SegmentValue::Exact(x), SegmentValue::Exact(y + 1)), (SegmentValue::Exact(x + 1), SegmentValue::Exact(y))],
                    color.filled(),
                )
            }))
            .map_err(|e| err(e.to_string()))?;

            if gap > 0 {
                let edge = ShapeStyle::from(&background).stroke_width(gap as u32);
                plot.draw_series(cells.iter().map(|&(i, j, _, _)| {
                    let (x, y) = (j as i32, n - 1 - i as i32);
                    Rectangle::new(
                        [(SegmentValue::Exact(x), SegmentValue::Exact(y + 1)), (SegmentValue::Exact(x + 1), SegmentValue::Exact(y))],
                        edge,
                    )
                }))
                .map_err(|e| err(e.to_string()))?;
            }

            let centered = Pos::new(HPos::Center, VPos::Center);
            plot.draw_series(cells.iter().map(|&(i, j, value, _)| {
                let (x, y) = (j as i32, n - 1 - i as i32);
                let text_style = if value.abs() > 0.6 { &light_text } else { &dark_text };
                Text::new(
                    format_coefficient(value),
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    text_style.clone().pos(centered),
                )
            }))
            .map_err(|e| err(e.to_string()))?;

            // Column names hang below the plot, reading bottom to top, so no
            // part of them sits under the cells.
            let column_font = tick_font
                .transform(FontTransform::Rotate270)
                .pos(Pos::new(HPos::Right, VPos::Center));
            for (j, name) in names.iter().enumerate() {
                let (x, y) = plot.backend_coord(&(SegmentValue::CenterOf(j as i32), SegmentValue::Exact(0)));
                root.draw_text(name, &column_font, (x, y + label_pad as i32))
                    .map_err(|e| err(e.to_string()))?;
            }

            root.present().map_err(|e| err(e.to_string()))?;
        }

        encode_png(buffer, width, height, title)
    }
}

/// Cell annotation: two decimals, `nan` for undefined coefficients.
pub fn format_coefficient(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", value)
    }
}

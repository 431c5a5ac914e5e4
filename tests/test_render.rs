//! Report runs through the plotters renderer, decoded back with `image`

use tempfile::TempDir;
use vinoveritas::report::{
    ArtifactKind, ChartStyle, PlottersRenderer, ReportGenerator, CORRELATION_MATRIX_FILE,
};

#[path = "common/mod.rs"]
mod common;

/// Default look at a resolution small enough to keep the run fast.
fn low_dpi_style(dpi: u32) -> ChartStyle {
    ChartStyle {
        dpi,
        ..ChartStyle::default()
    }
}

#[test]
fn test_rendered_images_match_figure_size() {
    let temp_dir = TempDir::new().unwrap();
    let style = low_dpi_style(20);
    let renderer = PlottersRenderer::new();

    let outcome = ReportGenerator::new(&renderer, &style, temp_dir.path())
        .generate(&common::wine_table())
        .unwrap();

    assert_eq!(outcome.artifacts.len(), 6);
    for artifact in &outcome.artifacts {
        let bytes = std::fs::read(&artifact.path).unwrap();
        assert_eq!(bytes.len(), artifact.bytes);

        let decoded = image::load_from_memory(&bytes).unwrap();
        let expected = match artifact.kind {
            ArtifactKind::Correlation => style.pixels(style.heatmap_figure),
            ArtifactKind::Distribution | ArtifactKind::TargetDistribution => {
                style.pixels(style.histogram_figure)
            }
        };
        assert_eq!(
            (decoded.width(), decoded.height()),
            expected,
            "{} has the wrong size",
            artifact.name
        );
    }
}

#[test]
fn test_rendering_is_deterministic() {
    let style = low_dpi_style(20);
    let renderer = PlottersRenderer::new();
    let table = common::wine_table();

    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    ReportGenerator::new(&renderer, &style, first.path())
        .generate(&table)
        .unwrap();
    ReportGenerator::new(&renderer, &style, second.path())
        .generate(&table)
        .unwrap();

    for name in ["dist_alcohol.png", CORRELATION_MATRIX_FILE] {
        assert_eq!(
            std::fs::read(first.path().join(name)).unwrap(),
            std::fs::read(second.path().join(name)).unwrap(),
            "{name} differs between runs"
        );
    }
}

#[test]
fn test_heatmap_labels_drawn_below_cells() {
    let temp_dir = TempDir::new().unwrap();
    let style = low_dpi_style(40);
    let renderer = PlottersRenderer::new();

    ReportGenerator::new(&renderer, &style, temp_dir.path())
        .generate(&common::wine_table())
        .unwrap();

    let heatmap = image::open(temp_dir.path().join(CORRELATION_MATRIX_FILE))
        .unwrap()
        .to_rgb8();
    let (width, height) = heatmap.dimensions();

    // The bottom band below the cells holds only the rotated column names
    let band_start = height - height / 8;
    let inked = (band_start..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| heatmap.get_pixel(x, y).0 != [255, 255, 255])
        .count();
    assert!(inked > 0, "no column labels under the heatmap");
}

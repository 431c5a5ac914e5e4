//! End-to-end tests for a report run with a recording renderer

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::*;
use tempfile::TempDir;
use vinoveritas::error::ReportError;
use vinoveritas::pipeline::FeatureTable;
use vinoveritas::report::{
    compute_report_data, AnalyticsSummary, ArtifactKind, ChartStyle, ReportGenerator,
    CORRELATION_MATRIX_FILE, QUALITY_DISTRIBUTION_FILE,
};

#[path = "common/mod.rs"]
mod common;

fn files_in(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_writes_one_artifact_per_feature_plus_two() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("static").join("plots");
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();

    let outcome = ReportGenerator::new(&renderer, &style, &out)
        .generate(&common::wine_table())
        .unwrap();

    let expected: BTreeSet<String> = [
        "dist_fixed_acidity.png",
        "dist_volatile_acidity.png",
        "dist_pH.png",
        "dist_alcohol.png",
        QUALITY_DISTRIBUTION_FILE,
        CORRELATION_MATRIX_FILE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    assert_eq!(files_in(&out), expected);
    assert_eq!(outcome.artifacts.len(), 6);
    assert!(!files_in(&out).contains("dist_quality.png"));
    assert_eq!(
        outcome
            .artifacts
            .iter()
            .filter(|a| a.kind == ArtifactKind::Distribution)
            .count(),
        4
    );
    assert_eq!(
        std::fs::read(out.join("dist_alcohol.png")).unwrap(),
        common::STUB_IMAGE
    );
}

#[test]
fn test_repeat_runs_produce_same_names() {
    let temp_dir = TempDir::new().unwrap();
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();
    let table = common::wine_table();
    let generator = ReportGenerator::new(&renderer, &style, temp_dir.path());

    let first = generator.generate(&table).unwrap();
    let second = generator.generate(&table).unwrap();

    assert_eq!(first.artifact_names(), second.artifact_names());
    assert_eq!(files_in(temp_dir.path()).len(), 6);
}

#[test]
fn test_chart_labels_follow_style() {
    let temp_dir = TempDir::new().unwrap();
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();

    ReportGenerator::new(&renderer, &style, temp_dir.path())
        .generate(&common::wine_table())
        .unwrap();

    let titles = renderer.titles.borrow();
    assert_eq!(titles[0], "Fixed Acidity Profile");
    assert!(titles.contains(&"Final Quality Yield Analysis".to_string()));
    assert_eq!(
        titles.last().unwrap(),
        "Global Chemical Dependency Matrix (Full Sample Set)"
    );
    assert_eq!(renderer.heatmap_columns.borrow().len(), 5);
}

#[test]
fn test_precondition_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("plots");
    let df = df! {
        "origin" => ["douro", "rioja", "mosel"],
        "quality" => [5i64, 6, 7],
    }
    .unwrap();
    let table = FeatureTable::new(df, "quality").unwrap();
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();

    let result = ReportGenerator::new(&renderer, &style, &out).generate(&table);

    assert!(matches!(result, Err(ReportError::InsufficientColumns { .. })));
    assert!(!out.exists(), "artifact directory must not be created");
    assert!(renderer.titles.borrow().is_empty());
}

#[test]
fn test_all_null_feature_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let df = df! {
        "alcohol" => [9.4f64, 9.8, 10.1],
        "chlorides" => [None::<f64>, None, None],
        "quality" => [5i64, 6, 7],
    }
    .unwrap();
    let table = FeatureTable::new(df, "quality").unwrap();
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();

    let result = ReportGenerator::new(&renderer, &style, temp_dir.path()).generate(&table);

    assert!(matches!(
        result,
        Err(ReportError::EmptyColumn { ref column }) if column == "chlorides"
    ));
    assert!(files_in(temp_dir.path()).is_empty());
}

#[test]
fn test_render_failure_aborts_run() {
    let temp_dir = TempDir::new().unwrap();
    let style = ChartStyle::default();

    let result = ReportGenerator::new(&common::FailingHeatmapRenderer, &style, temp_dir.path())
        .generate(&common::wine_table());

    assert!(matches!(result, Err(ReportError::Render { .. })));
}

#[test]
fn test_unwritable_output_is_filesystem_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("plots");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();

    let result = ReportGenerator::new(&renderer, &style, &blocker).generate(&common::wine_table());

    assert!(matches!(result, Err(ReportError::Filesystem(_))));
}

#[test]
fn test_progress_callback_sees_every_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let renderer = common::RecordingRenderer::default();
    let style = ChartStyle::default();
    let mut seen = Vec::new();

    let outcome = ReportGenerator::new(&renderer, &style, temp_dir.path())
        .generate_with(&common::wine_table(), |record| seen.push(record.name.clone()))
        .unwrap();

    assert_eq!(
        seen,
        outcome
            .artifact_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_report_data_uses_configured_bins() {
    let style = ChartStyle::default();
    let data = compute_report_data(&common::wine_table(), &style).unwrap();

    assert_eq!(data.features.len(), 4);
    for feature in &data.features {
        assert_eq!(feature.histogram.bins.len(), 30);
        assert_eq!(feature.histogram.total(), 40);
        assert!(!feature.density.is_empty());
    }
    assert_eq!(data.target_histogram.bins.len(), 6);
    assert_eq!(
        data.target_counts.iter().map(|c| c.count).sum::<usize>(),
        40
    );
}

#[test]
fn test_analytics_summary_round_trips_through_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("static").join("analytics.json");
    let style = ChartStyle::default();
    let data = compute_report_data(&common::wine_table(), &style).unwrap();

    let summary = AnalyticsSummary::from_report(&data, "winequality-red_par.csv", 40);
    summary.save(&path).unwrap();
    let loaded = AnalyticsSummary::load(&path).unwrap();

    assert_eq!(loaded.metadata.target_column, "quality");
    assert_eq!(loaded.metadata.rows, 40);
    assert_eq!(loaded.correlation.features.len(), 5);
    assert_eq!(loaded.correlation.nodes.len(), 25);
    assert_eq!(loaded.distributions.len(), 4);
    let alcohol = &loaded.distributions["alcohol"];
    assert_eq!(alcohol.counts.len(), 30);
    assert_eq!(alcohol.bins.len(), 31);
    assert_eq!(alcohol.counts.iter().sum::<usize>(), 40);
    assert_eq!(alcohol.kde_x.len(), alcohol.kde_y.len());
    assert!(!alcohol.kde_y.is_empty());
    assert!(!loaded.quality_distribution.is_empty());
}

#[test]
fn test_distribution_export_edges_follow_histogram() {
    let style = ChartStyle::default();
    let data = compute_report_data(&common::wine_table(), &style).unwrap();
    let summary = AnalyticsSummary::from_report(&data, "winequality-red_par.csv", 40);

    for dist in &data.features {
        let entry = &summary.distributions[&dist.feature];
        let first = &dist.histogram.bins[0];
        let last = &dist.histogram.bins[dist.histogram.bins.len() - 1];
        assert_eq!(entry.bins[0], first.start);
        assert_eq!(entry.bins[entry.bins.len() - 1], last.end);
        assert_eq!(entry.kde_y.len(), dist.density.len());
    }
}

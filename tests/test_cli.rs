//! Tests for CLI argument parsing and the binary's failure path

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use std::path::PathBuf;
use vinoveritas::cli::{Cli, Commands};

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["vinoveritas"]);

    assert!(cli.command.is_none(), "no subcommand means a report run");
    assert_eq!(cli.input, PathBuf::from("winequality-red_par.csv"));
    assert_eq!(cli.target, "quality");
    assert_eq!(cli.output_dir, PathBuf::from("static/plots"));
    assert_eq!(cli.analytics, PathBuf::from("static/analytics.json"));
    assert!(cli.style.is_none());
    assert_eq!(cli.infer_schema_length, 10000);
}

#[test]
fn test_cli_report_overrides() {
    let cli = Cli::parse_from([
        "vinoveritas",
        "-i",
        "white.parquet",
        "--target",
        "score",
        "--output-dir",
        "out/plots",
        "--style",
        "theme.json",
    ]);

    assert_eq!(cli.input, PathBuf::from("white.parquet"));
    assert_eq!(cli.target, "score");
    assert_eq!(cli.output_dir, PathBuf::from("out/plots"));
    assert_eq!(cli.style, Some(PathBuf::from("theme.json")));
}

#[test]
fn test_train_defaults() {
    let cli = Cli::parse_from(["vinoveritas", "train"]);

    match cli.command {
        Some(Commands::Train {
            input,
            target,
            output,
            infer_schema_length,
        }) => {
            assert_eq!(input, PathBuf::from("winequality-red_par.csv"));
            assert_eq!(target, "quality");
            assert_eq!(output, PathBuf::from("model.json"));
            assert_eq!(infer_schema_length, 10000);
        }
        other => panic!("expected train, got {other:?}"),
    }
}

#[test]
fn test_serve_flags() {
    let cli = Cli::parse_from([
        "vinoveritas",
        "serve",
        "--host",
        "0.0.0.0",
        "--port",
        "9000",
        "--plots-dir",
        "public/plots",
    ]);

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            model,
            plots_dir,
            ..
        }) => {
            assert_eq!(host, "0.0.0.0");
            assert_eq!(port, 9000);
            assert_eq!(model, PathBuf::from("model.json"));
            assert_eq!(plots_dir, PathBuf::from("public/plots"));
        }
        other => panic!("expected serve, got {other:?}"),
    }
}

#[test]
fn test_serve_rejects_port_zero() {
    let result = Cli::try_parse_from(["vinoveritas", "serve", "--port", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_missing_dataset_exits_non_zero() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    Command::cargo_bin("vinoveritas")
        .unwrap()
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dataset not found"));

    assert!(!temp_dir.path().join("static").exists());
}

#[test]
fn test_missing_target_exits_non_zero() {
    let mut df = common::create_wine_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);

    Command::cargo_bin("vinoveritas")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("--input")
        .arg(&csv_path)
        .arg("--target")
        .arg("rating")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target column 'rating' not found"));
}

#[test]
fn test_train_writes_model_file() {
    let mut df = common::create_wine_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let model_path = temp_dir.path().join("model.json");

    Command::cargo_bin("vinoveritas")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("train")
        .arg("--input")
        .arg(&csv_path)
        .arg("--output")
        .arg(&model_path)
        .assert()
        .success();

    let model = vinoveritas::model::LinearModel::load(&model_path).unwrap();
    assert_eq!(model.features.len(), 4);
}

#[test]
fn test_report_run_renders_every_chart() {
    let mut df = common::create_wine_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let style_path = temp_dir.path().join("style.json");
    let style = vinoveritas::report::ChartStyle {
        dpi: 20,
        ..Default::default()
    };
    std::fs::write(&style_path, serde_json::to_string(&style).unwrap()).unwrap();

    Command::cargo_bin("vinoveritas")
        .unwrap()
        .current_dir(temp_dir.path())
        .env("RUST_LOG", "vinoveritas=debug")
        .arg("--input")
        .arg(&csv_path)
        .arg("--style")
        .arg(&style_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote artifact"))
        .stderr(predicate::str::contains("correlation_matrix.png"));

    let plots = temp_dir.path().join("static").join("plots");
    assert_eq!(std::fs::read_dir(&plots).unwrap().count(), 6);
    let heatmap = image::open(plots.join("correlation_matrix.png")).unwrap();
    assert_eq!((heatmap.width(), heatmap.height()), style.pixels(style.heatmap_figure));
    assert!(temp_dir.path().join("static").join("analytics.json").exists());
}

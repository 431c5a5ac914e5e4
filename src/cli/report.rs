//! Default command: regenerate every chart from the dataset

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use crate::cli::logging::init_tracing;
use crate::cli::Cli;
use crate::pipeline::load_feature_table;
use crate::report::{AnalyticsSummary, ChartStyle, PlottersRenderer, ReportGenerator, ReportSummary};
use crate::utils::{
    create_progress_bar, create_spinner, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success,
};

/// Load, render, write. Any failure aborts the run.
pub fn run_report(cli: &Cli) -> Result<()> {
    // Progress goes to the terminal; tracing only speaks up when asked via RUST_LOG
    init_tracing("warn");
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &cli.target, &cli.output_dir, cli.style.as_deref());

    let chart_style = match &cli.style {
        Some(path) => ChartStyle::from_file(path)
            .with_context(|| format!("Failed to load chart style {}", path.display()))?,
        None => ChartStyle::default(),
    };

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let table = match load_feature_table(&cli.input, &cli.target, cli.infer_schema_length) {
        Ok(table) => table,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let features = table.feature_columns();
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", table.height());
    println!("      Features: {}", features.len());
    println!("      Target: {}", table.target());

    let mut summary = ReportSummary::new(table.height());
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Render charts
    print_step_header(2, "Render Charts");
    let renderer = PlottersRenderer::new();
    let generator = ReportGenerator::new(&renderer, &chart_style, &cli.output_dir);
    let progress = create_progress_bar(features.len() as u64 + 2, "Rendering");
    let outcome = generator
        .generate_with(&table, |record| {
            progress.set_message(record.name.clone());
            progress.inc(1);
        })
        .with_context(|| format!("Report generation failed for {}", cli.input.display()));
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };
    finish_with_success(&progress, "Charts rendered");
    print_success(&format!(
        "{} artifacts written to {}",
        outcome.artifacts.len(),
        cli.output_dir.display()
    ));
    print_step_time(outcome.elapsed);

    // Step 3: Analytics summary
    print_step_header(3, "Export Analytics");
    let analytics = AnalyticsSummary::from_report(
        &outcome.data,
        &cli.input.display().to_string(),
        table.height(),
    );
    analytics.save(&cli.analytics)?;
    print_info(&format!("Analytics summary: {}", cli.analytics.display()));

    summary.add_outcome(&outcome);
    summary.display();

    print_completion("Vino Veritas report complete!");
    Ok(())
}

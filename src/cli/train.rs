//! `train` subcommand: fit the quality model and persist it

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::model::LinearModel;
use crate::pipeline::load_feature_table;
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_step_header,
    print_step_time, print_success,
};

pub fn run_train(input: &Path, target: &str, output: &Path, infer_schema_length: usize) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));

    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let table = match load_feature_table(input, target, infer_schema_length) {
        Ok(table) => table,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    finish_with_success(&spinner, "Dataset loaded");
    print_step_time(step_start.elapsed());

    print_step_header(2, "Fit Model");
    let step_start = Instant::now();
    let spinner = create_spinner("Solving normal equations...");
    let model = match LinearModel::fit(&table) {
        Ok(model) => model,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).with_context(|| format!("Failed to fit model on {}", input.display()));
        }
    };
    finish_with_success(&spinner, "Model fitted");
    print_step_time(step_start.elapsed());

    model
        .save(output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;
    print_success(&format!("Model written to {}", output.display()));

    display_importances(&model);
    print_completion("Vino Veritas model ready!");
    Ok(())
}

fn display_importances(model: &LinearModel) {
    println!();
    println!(
        "    {} {}",
        style("🧪").cyan(),
        style("FEATURE IMPORTANCE").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!(
        "      Rows used: {}   R²: {}",
        model.metadata.rows,
        style(format!("{:.3}", model.metadata.r_squared)).yellow()
    );
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Importance").add_attribute(Attribute::Bold),
    ]);
    for (rank, item) in model.importances.iter().enumerate() {
        let share = Cell::new(format!("{:.1}%", item.importance * 100.0));
        let share = if rank == 0 {
            share.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            share
        };
        table.add_row(vec![Cell::new(&item.feature), share]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

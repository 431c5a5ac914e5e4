//! Vino Veritas: wine-quality report generator and prediction API
//!
//! With no subcommand the binary regenerates every chart under `static/plots`.
//! `train` fits the quality model, `serve` runs the HTTP API.

use anyhow::Result;
use clap::Parser;

use vinoveritas::cli::{run_report, run_serve, run_train, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Train {
            input,
            target,
            output,
            infer_schema_length,
        }) => run_train(input, target, output, *infer_schema_length),
        Some(Commands::Serve {
            host,
            port,
            model,
            analytics,
            plots_dir,
        }) => run_serve(host, *port, model, analytics, plots_dir),
        None => run_report(&cli),
    }
}

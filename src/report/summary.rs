//! Report run summary display

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::report::generator::{ArtifactKind, ReportOutcome};

/// Summary of one report run, printed once the artifacts are on disk
#[derive(Debug, Default)]
pub struct ReportSummary {
    pub rows: usize,
    pub feature_count: usize,
    pub artifacts: Vec<(String, ArtifactKind, usize)>,
    pub load_time: Duration,
    pub render_time: Duration,
    pub strongest_pair: Option<(String, String, f64)>,
}

impl ReportSummary {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    /// Record the outcome of the generator.
    pub fn add_outcome(&mut self, outcome: &ReportOutcome) {
        self.feature_count = outcome.data.features.len();
        self.render_time = outcome.elapsed;
        self.artifacts = outcome
            .artifacts
            .iter()
            .map(|a| (a.name.clone(), a.kind, a.bytes))
            .collect();

        // Strongest off-diagonal relationship, for a quick sanity read
        let m = &outcome.data.correlation;
        let mut best: Option<(String, String, f64)> = None;
        for i in 0..m.len() {
            for j in (i + 1)..m.len() {
                let v = m.get(i, j);
                if v.is_nan() {
                    continue;
                }
                if best.as_ref().map_or(true, |(_, _, b)| v.abs() > b.abs()) {
                    best = Some((m.columns[i].clone(), m.columns[j].clone(), v));
                }
            }
        }
        self.strongest_pair = best;
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(|(_, _, b)| *b).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("REPORT SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.rows)]);
        table.add_row(vec![Cell::new("🧪 Features"), Cell::new(self.feature_count)]);
        table.add_row(vec![
            Cell::new("🖼️  Artifacts"),
            Cell::new(self.artifacts.len())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("💾 Total size"),
            Cell::new(format!("{:.2} MB", self.total_bytes() as f64 / (1024.0 * 1024.0))),
        ]);
        if let Some((a, b, r)) = &self.strongest_pair {
            table.add_row(vec![
                Cell::new("🔗 Strongest pair"),
                Cell::new(format!("{} / {} ({:.2})", a, b, r)).fg(Color::Yellow),
            ]);
        }
        table.add_row(vec![
            Cell::new("⏱️  Load / Render"),
            Cell::new(format!(
                "{:.2}s / {:.2}s",
                self.load_time.as_secs_f64(),
                self.render_time.as_secs_f64()
            )),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.artifacts.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("ARTIFACTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (name, kind, bytes) in &self.artifacts {
                let tag = match kind {
                    ArtifactKind::Distribution => style("dist").dim(),
                    ArtifactKind::TargetDistribution => style("target").yellow(),
                    ArtifactKind::Correlation => style("corr").magenta(),
                };
                println!(
                    "        {} {:<40} {:>8} KB  {}",
                    style("•").dim(),
                    name,
                    bytes / 1024,
                    tag
                );
            }
        }
    }
}

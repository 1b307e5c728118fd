//! `plot-extract` — export the embedded scatter traces as portfolio JSON.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use plot_extract::{export_file, ExportOptions, ExportPaths, ExportReport, TraceReport};

/// Exit status when the input document does not exist.
pub const EXIT_INPUT_MISSING: u8 = 1;

/// Exit status for every other fatal error.
pub const EXIT_FAILURE: u8 = 2;

/// How operator output is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
    pub color: bool,
}

/// Terminal state of a run that did not hit a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Exported,
    InputMissing,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Exported => 0,
            Status::InputMissing => EXIT_INPUT_MISSING,
        }
    }
}

/// Run the export.
pub fn run(paths: &ExportPaths, options: ExportOptions, mode: OutputMode) -> Result<Status> {
    let s = Styled::new(mode.color);

    if !paths.input.exists() {
        if mode.json {
            output::print_json(&serde_json::json!({
                "error": "input_missing",
                "path": paths.input.display().to_string(),
                "hint": "Run the visualization pipeline first",
            }));
        } else {
            eprintln!(
                "  {} Error: {} not found. Run the pipeline first.",
                s.fail_sym(),
                paths.input.display()
            );
        }
        return Ok(Status::InputMissing);
    }

    if !mode.json && !mode.quiet {
        eprintln!("  Reading {}...", paths.input.display());
    }

    let report = export_file(paths, options)
        .with_context(|| format!("exporting traces from {}", paths.input.display()))?;

    if mode.json {
        let value = serde_json::to_value(&report).context("serializing export report")?;
        output::print_json(&value);
    } else if !mode.quiet {
        print_report(&s, &report);
    }

    Ok(Status::Exported)
}

/// Print per-trace lines and the summary.
fn print_report(s: &Styled, report: &ExportReport) {
    for trace in &report.traces {
        match trace {
            TraceReport::Exported(t) => {
                eprintln!("    {}: {} points", t.name, t.points);
            }
            TraceReport::Skipped(t) => {
                eprintln!(
                    "    {} Skipping trace '{}': unknown data format {}",
                    s.warn_sym(),
                    t.name,
                    s.dim(&format!("({} is {})", t.axis, t.reason))
                );
            }
        }
    }

    eprintln!();
    eprintln!(
        "  {} {} {} ({}, {} points)",
        s.ok_sym(),
        s.bold("Saved"),
        report.output.display(),
        output::format_kb(report.bytes_written),
        report.total_points
    );

    let skipped = report.skipped().count();
    if skipped > 0 {
        eprintln!("  {}", s.yellow(&format!("{skipped} trace(s) skipped")));
    }
}

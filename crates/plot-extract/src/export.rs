//! Build the condensed name → points mapping and write it to disk.

use crate::decoder::{
    decode_trace, Encoding, SkippedTrace, TraceOutcome, TracePoints, DEFAULT_DECIMALS,
};
use crate::error::{ExtractError, ExtractResult};
use crate::parser::extract_traces;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Input document, relative to the project root.
pub const DEFAULT_INPUT: &str = "output/audio_classifier_3d.html";

/// Exported JSON, relative to the project root.
pub const DEFAULT_OUTPUT: &str = "portfolio_data.json";

/// Tunables for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Decimal places kept in every exported value.
    pub decimals: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// Where to read the HTML document and where to write the JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ExportPaths {
    /// The standard locations under a project root.
    pub fn from_root(root: &Path) -> Self {
        Self {
            input: root.join(DEFAULT_INPUT),
            output: root.join(DEFAULT_OUTPUT),
        }
    }
}

/// Exported traces keyed by name, in first-seen order.
///
/// Inserting a name that already exists replaces its points and keeps the
/// key where it was first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PortfolioData(IndexMap<String, TracePoints>);

impl PortfolioData {
    /// Insert a trace, returning the points it replaced.
    pub fn insert(&mut self, name: String, points: TracePoints) -> Option<TracePoints> {
        self.0.insert(name, points)
    }

    pub fn get(&self, name: &str) -> Option<&TracePoints> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Serialize with no whitespace between tokens.
    pub fn to_json(&self) -> ExtractResult<String> {
        serde_json::to_string(self).map_err(ExtractError::Serialize)
    }
}

/// One decoded trace as reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub name: String,
    pub points: usize,
    pub encodings: [Encoding; 3],
}

/// What happened to one trace, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TraceReport {
    Exported(TraceSummary),
    Skipped(SkippedTrace),
}

/// Everything decoded from one document, before anything is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub data: PortfolioData,
    /// Every trace in document order, including exported ones later
    /// replaced by a same-named trace.
    pub traces: Vec<TraceReport>,
}

impl Conversion {
    pub fn exported(&self) -> impl Iterator<Item = &TraceSummary> {
        exported(&self.traces)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedTrace> {
        skipped(&self.traces)
    }

    /// Points across every decoded trace.
    pub fn total_points(&self) -> usize {
        self.exported().map(|t| t.points).sum()
    }
}

fn exported(traces: &[TraceReport]) -> impl Iterator<Item = &TraceSummary> {
    traces.iter().filter_map(|t| match t {
        TraceReport::Exported(summary) => Some(summary),
        TraceReport::Skipped(_) => None,
    })
}

fn skipped(traces: &[TraceReport]) -> impl Iterator<Item = &SkippedTrace> {
    traces.iter().filter_map(|t| match t {
        TraceReport::Skipped(skipped) => Some(skipped),
        TraceReport::Exported(_) => None,
    })
}

/// Decode a parsed trace list into the export mapping.
pub fn convert_traces(traces: &[Value], options: ExportOptions) -> ExtractResult<Conversion> {
    let mut conversion = Conversion::default();

    for trace in traces {
        match decode_trace(trace, options.decimals)? {
            TraceOutcome::Decoded {
                name,
                points,
                encodings,
            } => {
                let summary = TraceSummary {
                    name: name.clone(),
                    points: points.len(),
                    encodings,
                };
                if conversion.data.insert(name, points).is_some() {
                    debug!(trace = %summary.name, "replaced earlier trace with the same name");
                }
                conversion.traces.push(TraceReport::Exported(summary));
            }
            TraceOutcome::Skipped(skipped) => {
                conversion.traces.push(TraceReport::Skipped(skipped));
            }
        }
    }

    Ok(conversion)
}

/// Locate, parse and decode the last plot embedded in `html`.
pub fn convert_html(html: &str, options: ExportOptions) -> ExtractResult<Conversion> {
    let traces = extract_traces(html)?;
    convert_traces(&traces, options)
}

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub traces: Vec<TraceReport>,
    /// Distinct names in the written mapping.
    pub exported: usize,
    pub total_points: usize,
    pub bytes_written: u64,
}

impl ExportReport {
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedTrace> {
        skipped(&self.traces)
    }
}

/// Convert the document at `paths.input` and write the JSON to `paths.output`.
///
/// The output file is only opened once the whole document has been decoded,
/// so a missing input or a fatal decode error leaves any existing output
/// untouched.
pub fn export_file(paths: &ExportPaths, options: ExportOptions) -> ExtractResult<ExportReport> {
    if !paths.input.exists() {
        return Err(ExtractError::InputMissing(paths.input.clone()));
    }

    let html = std::fs::read_to_string(&paths.input).map_err(|source| ExtractError::Read {
        path: paths.input.clone(),
        source,
    })?;
    debug!(bytes = html.len(), input = %paths.input.display(), "read document");

    let conversion = convert_html(&html, options)?;
    if conversion.data.is_empty() {
        warn!(input = %paths.input.display(), "no traces could be exported");
    }
    let json = conversion.data.to_json()?;

    std::fs::write(&paths.output, &json).map_err(|source| ExtractError::Write {
        path: paths.output.clone(),
        source,
    })?;

    let total_points = conversion.total_points();
    info!(
        output = %paths.output.display(),
        traces = conversion.data.len(),
        total_points,
        "export written"
    );

    Ok(ExportReport {
        input: paths.input.clone(),
        output: paths.output.clone(),
        exported: conversion.data.len(),
        traces: conversion.traces,
        total_points,
        bytes_written: json.len() as u64,
    })
}

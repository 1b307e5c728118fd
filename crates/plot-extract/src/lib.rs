//! Pull 3D scatter traces out of a rendered Plotly HTML document and
//! condense them to compact JSON.
//!
//! The pipeline is a single pass: [`locator`] finds the trace array of the
//! last `Plotly.newPlot(` call, [`parser`] reads exactly that array,
//! [`decoder`] turns every axis (plain or base64-packed) into rounded
//! coordinates, and [`export`] assembles and writes the name → points mapping.

pub mod decoder;
pub mod error;
pub mod export;
pub mod locator;
pub mod parser;

pub use decoder::{
    decode_trace, round_to, Axis, Coord, Dtype, EncodedArray, Encoding, SkippedTrace,
    TraceOutcome, TracePoints, UnknownShape, DEFAULT_DECIMALS, MAX_DECIMALS,
};
pub use error::{ExtractError, ExtractResult};
pub use export::{
    convert_html, convert_traces, export_file, Conversion, ExportOptions, ExportPaths,
    ExportReport, PortfolioData, TraceReport, TraceSummary,
};
pub use locator::{locate_trace_array, PLOT_MARKER};
pub use parser::{extract_traces, parse_traces};

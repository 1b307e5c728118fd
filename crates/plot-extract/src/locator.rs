//! Find the embedded trace array inside a rendered Plotly HTML document.
//!
//! This is a textual heuristic, not an HTML parse. A standalone Plotly export
//! inlines the whole plotly.js bundle, which itself mentions
//! `Plotly.newPlot(`; the call that carries the rendered data is always the
//! last one in the document. After that call the first argument that opens an
//! array of objects is the trace list. Arrays that start with a `customdata`
//! key are preferred because incidental text rarely looks like that.

use crate::error::{ExtractError, ExtractResult};
use tracing::debug;

/// The plot-initialization call whose first array argument holds the traces.
pub const PLOT_MARKER: &str = "Plotly.newPlot(";

/// Preferred opening of the trace array.
const CUSTOMDATA_ARRAY_START: &str = r#"[{"customdata"#;

/// Fallback opening: any array whose first element is an object.
const OBJECT_ARRAY_START: &str = r#"[{""#;

/// Return the byte offset in `html` where the trace-array JSON begins.
pub fn locate_trace_array(html: &str) -> ExtractResult<usize> {
    let marker_at = html.rfind(PLOT_MARKER).ok_or(ExtractError::MarkerNotFound {
        marker: PLOT_MARKER,
    })?;

    let after = &html[marker_at..];
    let relative = after
        .find(CUSTOMDATA_ARRAY_START)
        .or_else(|| after.find(OBJECT_ARRAY_START))
        .ok_or(ExtractError::TraceArrayNotFound {
            marker: PLOT_MARKER,
        })?;

    let offset = marker_at + relative;
    debug!(marker_at, offset, "located trace array");
    Ok(offset)
}

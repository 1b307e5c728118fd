//! Parse the trace array out of the located document slice.

use crate::error::ExtractResult;
use crate::locator::locate_trace_array;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Deserialize exactly one JSON array from the start of `text`.
///
/// Whatever follows the closing `]` (the rest of the `newPlot` arguments,
/// `</script>`, the remainder of the page) is left unread.
pub fn parse_traces(text: &str) -> ExtractResult<Vec<Value>> {
    let mut de = serde_json::Deserializer::from_str(text);
    let traces = Vec::<Value>::deserialize(&mut de)?;
    debug!(count = traces.len(), "parsed trace array");
    Ok(traces)
}

/// Locate and parse the trace array of the last plot in an HTML document.
pub fn extract_traces(html: &str) -> ExtractResult<Vec<Value>> {
    let offset = locate_trace_array(html)?;
    parse_traces(&html[offset..])
}

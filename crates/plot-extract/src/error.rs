//! Error types for trace extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end an extraction run.
///
/// A trace whose axes have an unrecognised shape is not an error: it is
/// skipped and recorded in the [`ExportReport`](crate::export::ExportReport).
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input HTML document does not exist.
    #[error("{} not found", .0.display())]
    InputMissing(PathBuf),

    /// No plot-initialization call appears anywhere in the document.
    #[error("no `{marker}` call found in document")]
    MarkerNotFound { marker: &'static str },

    /// The last plot-initialization call is not followed by a trace array.
    #[error("no trace array found after the last `{marker}` call")]
    TraceArrayNotFound { marker: &'static str },

    /// The text at the located offset is not a JSON array.
    #[error("malformed trace data: {0}")]
    MalformedData(#[from] serde_json::Error),

    /// A packed array's `bdata` field is not valid base64.
    #[error("invalid base64 in packed array of trace '{trace}': {source}")]
    InvalidBase64 {
        trace: String,
        #[source]
        source: base64::DecodeError,
    },

    /// A packed buffer's byte length is not a whole number of elements.
    #[error("packed {dtype} buffer of trace '{trace}' has {len} bytes, not a multiple of {width}")]
    MisalignedBuffer {
        trace: String,
        dtype: &'static str,
        len: usize,
        width: usize,
    },

    /// A packed array declares a dtype this tool cannot decode.
    #[error("unsupported packed dtype `{dtype}` in trace '{trace}'")]
    UnsupportedDtype { trace: String, dtype: String },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Whether this is one of the "payload not found" conditions.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MarkerNotFound { .. } | Self::TraceArrayNotFound { .. }
        )
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

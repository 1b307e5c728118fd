//! Normalize Plotly trace axes into flat, rounded coordinate sequences.
//!
//! Plotly writes a numeric axis either as a plain JSON array or, for typed
//! arrays, as `{"dtype": "f4", "bdata": "<base64>"}` where `bdata` holds the
//! little-endian element bytes. Each axis is classified into an
//! [`EncodedArray`] (or an [`UnknownShape`]) before anything is decoded.
//!
//! Integers stay integers: only floating-point values are rounded, so `[7, 8]`
//! is exported as `[7,8]` and large ids keep every digit.

use crate::error::{ExtractError, ExtractResult};
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;
use tracing::{info, warn};

/// Decimal places kept in exported values unless configured otherwise.
pub const DEFAULT_DECIMALS: u32 = 2;

/// Beyond this an f64 carries no further decimal digits worth keeping.
pub const MAX_DECIMALS: u32 = 15;

/// Name used for traces that carry no `name` field.
pub const UNNAMED_TRACE: &str = "unknown";

/// Round `value` to `decimals` places, ties to even on the exact binary value.
///
/// The result is the `f64` nearest to the rounded decimal, so `1.005` (stored
/// as `1.00499999…`) becomes `1.0`. Non-finite values are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// One exported coordinate value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Int(i64),
    /// Positive integers beyond `i64::MAX`.
    UInt(u64),
    Float(f64),
}

impl Coord {
    /// Round floats to `decimals` places. Integers are returned unchanged.
    pub fn rounded(self, decimals: u32) -> Self {
        match self {
            Self::Float(v) => Self::Float(round_to(v, decimals)),
            int => int,
        }
    }
}

impl From<&Number> for Coord {
    fn from(n: &Number) -> Self {
        if let Some(v) = n.as_i64() {
            Self::Int(v)
        } else if let Some(v) = n.as_u64() {
            Self::UInt(v)
        } else {
            Self::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// One of the three coordinate axes of a scatter trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn key(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Element type of a packed typed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    F4,
    F8,
    I1,
    U1,
    /// Clamped bytes (`Uint8ClampedArray`); decodes like `U1`.
    U1c,
    I2,
    U2,
    I4,
    U4,
}

impl Dtype {
    /// Parse a Plotly dtype tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "f4" => Self::F4,
            "f8" => Self::F8,
            "i1" => Self::I1,
            "u1" => Self::U1,
            "u1c" => Self::U1c,
            "i2" => Self::I2,
            "u2" => Self::U2,
            "i4" => Self::I4,
            "u4" => Self::U4,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::F4 => "f4",
            Self::F8 => "f8",
            Self::I1 => "i1",
            Self::U1 => "u1",
            Self::U1c => "u1c",
            Self::I2 => "i2",
            Self::U2 => "u2",
            Self::I4 => "i4",
            Self::U4 => "u4",
        }
    }

    /// Bytes per element.
    pub fn width(self) -> usize {
        match self {
            Self::I1 | Self::U1 | Self::U1c => 1,
            Self::I2 | Self::U2 => 2,
            Self::F4 | Self::I4 | Self::U4 => 4,
            Self::F8 => 8,
        }
    }

    /// Read one little-endian element. `b` is exactly `width()` bytes long.
    fn read(self, b: &[u8]) -> Coord {
        match self {
            Self::F4 => Coord::Float(f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64),
            Self::F8 => Coord::Float(f64::from_le_bytes([
                b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            ])),
            Self::I1 => Coord::Int(b[0] as i8 as i64),
            Self::U1 | Self::U1c => Coord::Int(b[0] as i64),
            Self::I2 => Coord::Int(i16::from_le_bytes([b[0], b[1]]) as i64),
            Self::U2 => Coord::Int(u16::from_le_bytes([b[0], b[1]]) as i64),
            Self::I4 => Coord::Int(i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64),
            Self::U4 => Coord::Int(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64),
        }
    }
}

/// Why an axis could not be classified as plain or packed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UnknownShape {
    Missing,
    Null,
    Bool,
    Number,
    String,
    NonNumericElement { index: usize },
    ObjectWithoutBdata,
}

impl fmt::Display for UnknownShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("field missing"),
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("boolean"),
            Self::Number => f.write_str("bare number"),
            Self::String => f.write_str("bare string"),
            Self::NonNumericElement { index } => {
                write!(f, "non-numeric element at index {index}")
            }
            Self::ObjectWithoutBdata => f.write_str("object without string `bdata`"),
        }
    }
}

/// A decodable on-disk shape of one trace axis.
///
/// Anything else is reported by [`EncodedArray::classify`] as an
/// [`UnknownShape`], so a value of this type can always be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedArray<'a> {
    /// A JSON array whose elements are all numbers.
    Plain(&'a [Value]),
    /// A typed array: base64 element bytes plus an optional dtype tag.
    Packed {
        bdata: &'a str,
        dtype: Option<&'a Value>,
    },
}

impl<'a> EncodedArray<'a> {
    /// Classify a trace axis field (`None` when the field is absent).
    pub fn classify(field: Option<&'a Value>) -> Result<Self, UnknownShape> {
        let Some(value) = field else {
            return Err(UnknownShape::Missing);
        };
        match value {
            Value::Array(items) => match items.iter().position(|v| !v.is_number()) {
                None => Ok(Self::Plain(items)),
                Some(index) => Err(UnknownShape::NonNumericElement { index }),
            },
            Value::Object(obj) => match obj.get("bdata").and_then(Value::as_str) {
                Some(bdata) => Ok(Self::Packed {
                    bdata,
                    dtype: obj.get("dtype").filter(|d| !d.is_null()),
                }),
                None => Err(UnknownShape::ObjectWithoutBdata),
            },
            Value::Null => Err(UnknownShape::Null),
            Value::Bool(_) => Err(UnknownShape::Bool),
            Value::Number(_) => Err(UnknownShape::Number),
            Value::String(_) => Err(UnknownShape::String),
        }
    }
}

/// How an axis was stored in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    Packed(Dtype),
}

impl Serialize for Encoding {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Encoding::Plain => serializer.serialize_str("plain"),
            Encoding::Packed(dtype) => serializer.serialize_str(dtype.name()),
        }
    }
}

/// Rounded coordinates of one trace, in the exported layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TracePoints {
    pub x: Vec<Coord>,
    pub y: Vec<Coord>,
    pub z: Vec<Coord>,
}

impl TracePoints {
    /// Number of points, taken from the `x` axis.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut Vec<Coord> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// A trace left out of the export because an axis had an unknown shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTrace {
    pub name: String,
    pub axis: Axis,
    pub reason: UnknownShape,
}

/// Result of decoding a single trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    Decoded {
        name: String,
        points: TracePoints,
        encodings: [Encoding; 3],
    },
    Skipped(SkippedTrace),
}

/// Display name of a trace: its `name` string, the JSON text of a
/// non-string name, or [`UNNAMED_TRACE`].
pub fn trace_name(trace: &Value) -> String {
    match trace.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => UNNAMED_TRACE.to_string(),
    }
}

/// Decode the `x`, `y`, `z` axes of one trace object.
///
/// All three axes are classified before any is decoded, so a trace with an
/// unknown axis is skipped without touching its packed buffers.
pub fn decode_trace(trace: &Value, decimals: u32) -> ExtractResult<TraceOutcome> {
    let name = trace_name(trace);
    let fields = trace.as_object();
    let field = |axis: Axis| fields.and_then(|obj| obj.get(axis.key()));

    let mut encoded = Vec::with_capacity(3);
    for axis in Axis::ALL {
        match EncodedArray::classify(field(axis)) {
            Ok(array) => encoded.push((axis, array)),
            Err(reason) => {
                warn!(trace = %name, %axis, %reason, "skipping trace with unknown data format");
                return Ok(TraceOutcome::Skipped(SkippedTrace { name, axis, reason }));
            }
        }
    }

    let mut points = TracePoints::default();
    let mut encodings = [Encoding::Plain; 3];
    for (i, (axis, array)) in encoded.into_iter().enumerate() {
        let (values, encoding) = decode_axis(&name, array, decimals)?;
        *points.axis_mut(axis) = values;
        encodings[i] = encoding;
    }

    if points.y.len() != points.x.len() || points.z.len() != points.x.len() {
        warn!(
            trace = %name,
            x = points.x.len(),
            y = points.y.len(),
            z = points.z.len(),
            "trace axes differ in length"
        );
    }

    info!(trace = %name, points = points.len(), "decoded trace");
    Ok(TraceOutcome::Decoded {
        name,
        points,
        encodings,
    })
}

fn decode_axis(
    trace: &str,
    array: EncodedArray<'_>,
    decimals: u32,
) -> ExtractResult<(Vec<Coord>, Encoding)> {
    match array {
        EncodedArray::Plain(items) => {
            let values = items
                .iter()
                .filter_map(Value::as_number)
                .map(|n| Coord::from(n).rounded(decimals))
                .collect();
            Ok((values, Encoding::Plain))
        }
        EncodedArray::Packed { bdata, dtype } => {
            let dtype = resolve_dtype(trace, dtype)?;
            let values = decode_packed(trace, bdata, dtype, decimals)?;
            Ok((values, Encoding::Packed(dtype)))
        }
    }
}

fn resolve_dtype(trace: &str, tag: Option<&Value>) -> ExtractResult<Dtype> {
    match tag {
        None => Ok(Dtype::F4),
        Some(Value::String(tag)) => {
            Dtype::parse(tag).ok_or_else(|| ExtractError::UnsupportedDtype {
                trace: trace.to_string(),
                dtype: tag.clone(),
            })
        }
        Some(other) => Err(ExtractError::UnsupportedDtype {
            trace: trace.to_string(),
            dtype: other.to_string(),
        }),
    }
}

/// Decode a base64 buffer of little-endian `dtype` elements.
///
/// Float dtypes are rounded to `decimals`; integer dtypes come back as
/// integers.
pub fn decode_packed(
    trace: &str,
    bdata: &str,
    dtype: Dtype,
    decimals: u32,
) -> ExtractResult<Vec<Coord>> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(bdata.as_bytes())
        .map_err(|source| ExtractError::InvalidBase64 {
            trace: trace.to_string(),
            source,
        })?;

    let width = dtype.width();
    if raw.len() % width != 0 {
        return Err(ExtractError::MisalignedBuffer {
            trace: trace.to_string(),
            dtype: dtype.name(),
            len: raw.len(),
            width,
        });
    }

    Ok(raw
        .chunks_exact(width)
        .map(|chunk| dtype.read(chunk).rounded(decimals))
        .collect())
}

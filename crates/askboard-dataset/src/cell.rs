//! Typed cell values
//!
//! Defines [`CellValue`], the tagged union over every value shape the
//! pipeline handles. An explicit variant per shape keeps classification and
//! normalization pure matches instead of runtime type inspection.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format for date-time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single typed cell in a tabular value
///
/// Serializes untagged, so tables cross the wire as plain JSON scalars
/// (`null`, booleans, numbers, strings). Variant order matters for
/// deserialization: integers are tried before floats, plain text before
/// temporal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Number(f64),
    /// Text value
    Text(String),
    /// Temporal value (date or date-time, no timezone)
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Check whether the cell is missing
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell, if it has one
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Temporal view of the cell, if it has one
    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Text view of the cell, if it is textual
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the cell for human-readable output (markdown previews, CSV)
    ///
    /// Numbers use `Display`, which never emits scientific notation.
    /// Missing values render as the empty string.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Timestamp(ts) => ts.format(DATETIME_FORMAT).to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

//! Raw agent results
//!
//! [`RawAgentResult`] is the tagged union over the loosely-typed shapes an
//! analytic agent returns. Produced once per invocation, consumed by the
//! pipeline's classifier, never persisted.

use askboard_dataset::TableData;

/// The untyped answer shape returned by one agent invocation
#[derive(Debug, Clone, PartialEq)]
pub enum RawAgentResult {
    /// A single numeric value
    Scalar(f64),
    /// Free text, possibly carrying an embedded structured payload
    Text(String),
    /// A two-dimensional result with named columns
    Table(TableData),
}

impl RawAgentResult {
    /// Whether the result carries tabular structure
    #[inline]
    #[must_use]
    pub fn is_tabular(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// Borrow the table, if the result is tabular
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&TableData> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Borrow the text, if the result is textual
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for RawAgentResult {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<String> for RawAgentResult {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RawAgentResult {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<TableData> for RawAgentResult {
    fn from(value: TableData) -> Self {
        Self::Table(value)
    }
}

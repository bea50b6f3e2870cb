//! Tabular result data
//!
//! [`TableData`] is the two-dimensional shape shared between raw agent
//! results and the normalized response envelope.

use crate::cell::CellValue;
use serde::{Deserialize, Serialize};

/// Errors for tabular data construction
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A data row does not match the column header
    #[error("row {row} has {actual} cells, expected {expected}")]
    ShapeMismatch {
        /// Zero-based row index
        row: usize,
        /// Cells expected per row (column count)
        expected: usize,
        /// Cells found in the row
        actual: usize,
    },

    /// Rows present without column names
    #[error("table has {rows} data rows but no columns")]
    MissingColumns {
        /// Number of orphaned rows
        rows: usize,
    },
}

/// A named-column table
///
/// # Invariants
/// - Either completely empty (`columns` and `data` both empty), or every row
///   has exactly `columns.len()` cells. Enforced by [`TableData::new`] and
///   checked on decoded input via [`TableData::validate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    /// Ordered column names
    #[serde(default)]
    pub columns: Vec<String>,
    /// Ordered data rows
    #[serde(default)]
    pub data: Vec<Vec<CellValue>>,
}

impl TableData {
    /// Create a table, enforcing the shape invariant
    ///
    /// # Errors
    /// Returns [`TableError`] if any row length differs from the column count
    /// or rows are present without columns.
    pub fn new(columns: Vec<String>, data: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let table = Self { columns, data };
        table.validate()?;
        Ok(table)
    }

    /// The completely empty table
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check the shape invariant on an already-built table
    ///
    /// # Errors
    /// Returns [`TableError`] when the invariant does not hold.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.columns.is_empty() {
            if self.data.is_empty() {
                return Ok(());
            }
            return Err(TableError::MissingColumns {
                rows: self.data.len(),
            });
        }
        for (row, cells) in self.data.iter().enumerate() {
            if cells.len() != self.columns.len() {
                return Err(TableError::ShapeMismatch {
                    row,
                    expected: self.columns.len(),
                    actual: cells.len(),
                });
            }
        }
        Ok(())
    }

    /// Whether the table carries no columns and no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.data.is_empty()
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Index of the first column containing a temporal cell, if any
    #[must_use]
    pub fn first_temporal_column(&self) -> Option<usize> {
        (0..self.columns.len()).find(|&col| {
            self.data
                .iter()
                .any(|row| matches!(row.get(col), Some(CellValue::Timestamp(_))))
        })
    }

    /// Render the table as a markdown pipe table
    ///
    /// Used to embed tabular context into agent instructions.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        out.push_str("| ");
        out.push_str(&self.columns.join(" | "));
        out.push_str(" |\n|");
        for _ in &self.columns {
            out.push_str(" --- |");
        }
        out.push('\n');
        for row in &self.data {
            out.push_str("| ");
            let rendered: Vec<String> = row.iter().map(CellValue::render).collect();
            out.push_str(&rendered.join(" | "));
            out.push_str(" |\n");
        }
        out
    }
}

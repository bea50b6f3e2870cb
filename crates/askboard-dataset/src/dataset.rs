//! Materialized datasets
//!
//! A [`Dataset`] is an ordered collection of named, typed columns — the
//! already-resolved content a pipeline run queries against. Datasets are
//! immutable once built and referenced, not copied, by the pipeline.

use crate::cell::CellValue;
use crate::table::TableData;

/// Errors for dataset construction
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Column lengths differ
    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        /// Offending column name
        column: String,
        /// Values expected (length of the first column)
        expected: usize,
        /// Values found
        actual: usize,
    },

    /// No columns supplied
    #[error("dataset '{0}' has no columns")]
    Empty(String),
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column values, one per row
    pub values: Vec<CellValue>,
}

impl Column {
    /// Create a new column
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An immutable, materialized dataset
///
/// # Invariants
/// - At least one column; all columns have equal length.
/// - Content never changes after construction; the content digest computed
///   over [`Dataset::content_bytes`] stays valid for the dataset's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
}

impl Dataset {
    /// Create a dataset, enforcing equal column lengths
    ///
    /// # Errors
    /// Returns [`DatasetError`] when no columns are supplied or lengths differ.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, DatasetError> {
        let name = name.into();
        let Some(first) = columns.first() else {
            return Err(DatasetError::Empty(name));
        };
        let expected = first.values.len();
        for column in &columns {
            if column.values.len() != expected {
                return Err(DatasetError::LengthMismatch {
                    column: column.name.clone(),
                    expected,
                    actual: column.values.len(),
                });
            }
        }
        Ok(Self { name, columns })
    }

    /// Build a dataset from a tabular result (column-major transpose)
    ///
    /// Used when a previous answer becomes the input of a follow-up
    /// question.
    ///
    /// # Errors
    /// Returns [`DatasetError::Empty`] for an empty table.
    pub fn from_table(name: impl Into<String>, table: &TableData) -> Result<Self, DatasetError> {
        let columns = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col_name)| {
                let values = table
                    .data
                    .iter()
                    .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
                    .collect();
                Column::new(col_name.clone(), values)
            })
            .collect();
        Self::new(name, columns)
    }

    /// Dataset name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in order
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Serialized content bytes (CSV) used for content addressing
    ///
    /// Deterministic for a given dataset: header row, then data rows, `\n`
    /// separated, cells escaped per RFC 4180.
    #[must_use]
    pub fn content_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        let header: Vec<String> = self.columns.iter().map(|c| csv_escape(&c.name)).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in 0..self.row_count() {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| csv_escape(&c.values[row].render()))
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Markdown preview (header plus the first `max_rows` rows)
    ///
    /// Embedded into planner instructions so the agent sees the data shape.
    #[must_use]
    pub fn to_markdown(&self, max_rows: usize) -> String {
        let mut out = String::new();
        out.push_str("| ");
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&names.join(" | "));
        out.push_str(" |\n|");
        for _ in &self.columns {
            out.push_str(" --- |");
        }
        out.push('\n');
        for row in 0..self.row_count().min(max_rows) {
            out.push_str("| ");
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.values[row].render())
                .collect();
            out.push_str(&cells.join(" | "));
            out.push_str(" |\n");
        }
        out
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            "sales",
            vec![
                Column::new("region", vec!["north".into(), "south".into()]),
                Column::new("amount", vec![CellValue::from(10.5), CellValue::Null]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn dataset_new_valid() {
        let ds = sample();
        assert_eq!(ds.name(), "sales");
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.columns().len(), 2);
    }

    #[test]
    fn dataset_rejects_length_mismatch() {
        let result = Dataset::new(
            "bad",
            vec![
                Column::new("a", vec![CellValue::Int(1)]),
                Column::new("b", vec![]),
            ],
        );
        assert!(matches!(
            result,
            Err(DatasetError::LengthMismatch { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn dataset_rejects_no_columns() {
        assert!(matches!(
            Dataset::new("empty", vec![]),
            Err(DatasetError::Empty(_))
        ));
    }

    #[test]
    fn dataset_content_bytes_deterministic() {
        assert_eq!(sample().content_bytes(), sample().content_bytes());
    }

    #[test]
    fn dataset_content_bytes_csv_shape() {
        let csv = String::from_utf8(sample().content_bytes()).unwrap();
        assert_eq!(csv, "region,amount\nnorth,10.5\nsouth,\n");
    }

    #[test]
    fn dataset_csv_escapes_delimiters() {
        let ds = Dataset::new(
            "t",
            vec![Column::new("label", vec![CellValue::from("a,\"b\"")])],
        )
        .unwrap();
        let csv = String::from_utf8(ds.content_bytes()).unwrap();
        assert_eq!(csv, "label\n\"a,\"\"b\"\"\"\n");
    }

    #[test]
    fn dataset_markdown_preview_limits_rows() {
        let md = sample().to_markdown(1);
        assert!(md.contains("| region | amount |"));
        assert!(md.contains("| north | 10.5 |"));
        assert!(!md.contains("south"));
    }

    #[test]
    fn dataset_from_table_transposes() {
        let table = TableData::new(
            vec!["region".into(), "amount".into()],
            vec![
                vec!["north".into(), CellValue::from(10.5)],
                vec!["south".into(), CellValue::Null],
            ],
        )
        .unwrap();
        let ds = Dataset::from_table("answer", &table).unwrap();
        assert_eq!(ds, sample().clone_renamed("answer"));
    }

    impl Dataset {
        fn clone_renamed(&self, name: &str) -> Dataset {
            Dataset {
                name: name.to_string(),
                columns: self.columns.clone(),
            }
        }
    }
}

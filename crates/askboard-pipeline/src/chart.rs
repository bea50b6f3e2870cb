//! Chart specifications
//!
//! The derived visualization artifact attached to tabular answers. Absence
//! is a valid state; graph synthesis is best-effort.

use askboard_dataset::CellValue;
use serde::{Deserialize, Serialize};

/// Supported chart families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Grouped or stacked bars per category
    Bar,
    /// Proportions of the last series column
    Pie,
    /// Trend lines per category
    Line,
}

/// Series values for a chart
///
/// Bar and line charts carry one numeric sequence per label; pie charts
/// carry a single flat sequence. Untagged so the wire stays plain arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartValues {
    /// One row of values per label (bar, line)
    Series(Vec<Vec<f64>>),
    /// One value per label (pie)
    Flat(Vec<f64>),
}

/// The data block of one chart recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Axis labels, one per data row
    pub labels: Vec<CellValue>,
    /// Series names
    pub categories: Vec<String>,
    /// Numeric values, nested or flat per [`ChartValues`]
    pub values: ChartValues,
    /// Whether series stack
    #[serde(rename = "isStacked", default)]
    pub is_stacked: bool,
}

/// One chart recommendation with its insight strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Chart family
    pub chart_type: ChartKind,
    /// Data block
    pub data_format: ChartData,
    /// Short natural-language observations
    #[serde(default)]
    pub insight: Vec<String>,
}

/// Top-level payload shape produced by the graph agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartsPayload {
    /// Chart recommendations in order
    #[serde(default)]
    pub charts: Vec<Chart>,
}

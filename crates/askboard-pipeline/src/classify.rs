//! Response classification
//!
//! Pure functions assigning a raw agent result to one of three handling
//! paths: scalar, ambiguous, or tabular. Ambiguity detection is a substring
//! heuristic over a small fixed marker set; false positives and negatives
//! are tolerated downstream through bounded replanning.

use crate::sanitize::{decode_text, DecodedText};
use askboard_agent::RawAgentResult;
use askboard_dataset::TableData;

/// Fixed failure markers recognized in agent text
///
/// Matches indications of missing data, inability to answer, or a generated
/// image reference in place of data.
pub const FAILURE_MARKERS: [&str; 3] = ["Unfortunately", ".png", "No data available"];

/// Handling path for a classified result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Numeric or single-value text answer
    Scalar,
    /// Low-confidence or failure-shaped answer; replan, then degrade
    Ambiguous,
    /// Two-dimensional answer with named columns
    Tabular,
}

/// Single point of change for the ambiguity heuristic
#[inline]
#[must_use]
pub fn looks_ambiguous(text: &str) -> bool {
    FAILURE_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Classify a raw agent result
///
/// Tie-break: a result that matches a failure marker *and* has tabular
/// shape is Ambiguous — re-asking beats returning a degraded table.
/// JSON-shaped text that fails strict parsing counts as malformed output
/// and is likewise Ambiguous.
#[must_use]
pub fn classify(result: &RawAgentResult) -> Classification {
    match result {
        RawAgentResult::Scalar(_) => Classification::Scalar,
        RawAgentResult::Table(table) => {
            if table_mentions_failure(table) {
                Classification::Ambiguous
            } else {
                Classification::Tabular
            }
        }
        RawAgentResult::Text(text) => classify_text(text),
    }
}

fn classify_text(text: &str) -> Classification {
    if looks_ambiguous(text) {
        return Classification::Ambiguous;
    }
    match decode_text(text) {
        DecodedText::Payload(payload) if !payload.table.is_empty() => Classification::Tabular,
        DecodedText::Payload(_) | DecodedText::Plain => Classification::Scalar,
        DecodedText::Malformed => Classification::Ambiguous,
    }
}

fn table_mentions_failure(table: &TableData) -> bool {
    table.columns.iter().any(|name| looks_ambiguous(name))
        || table
            .data
            .iter()
            .flatten()
            .filter_map(|cell| cell.as_text())
            .any(looks_ambiguous)
}

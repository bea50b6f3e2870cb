//! Response normalization
//!
//! Converts any classified agent result into the canonical message-list +
//! table shape. Numeric and temporal canonicalization happens here, in
//! code — no agent round-trip is needed for a deterministic transform.

use crate::classify::Classification;
use crate::sanitize::{decode_text, DecodedText, StructuredPayload};
use askboard_agent::RawAgentResult;
use askboard_dataset::{CellValue, TableData, DATETIME_FORMAT};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Fixed user-facing message for ambiguous answers after the replan budget
/// is exhausted.
pub use askboard_agent::instructions::INSUFFICIENT_DATA_MESSAGE as FALLBACK_MESSAGE;

/// Month-year display format for month-granularity temporal columns.
pub const MONTH_YEAR_FORMAT: &str = "%b-%Y";

/// The canonical normalized response content
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    /// Ordered response messages
    pub message: Vec<String>,
    /// Canonical table, possibly empty
    pub table: TableData,
}

impl NormalizedResponse {
    /// The fixed degraded response for exhausted ambiguity
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            message: vec![FALLBACK_MESSAGE.to_string()],
            table: TableData::empty(),
        }
    }

    fn scalar(text: String) -> Self {
        Self {
            message: vec![text],
            table: TableData::empty(),
        }
    }
}

/// Normalize a classified agent result
///
/// Ambiguous classifications (after the replan budget is spent) produce the
/// fixed fallback; everything else is normalized by its shape.
#[must_use]
pub fn normalize(result: &RawAgentResult, classification: Classification) -> NormalizedResponse {
    if classification == Classification::Ambiguous {
        return NormalizedResponse::fallback();
    }
    match result {
        RawAgentResult::Scalar(value) => NormalizedResponse::scalar(stringify_scalar(*value)),
        RawAgentResult::Table(table) => NormalizedResponse {
            message: Vec::new(),
            table: normalize_table(table),
        },
        RawAgentResult::Text(text) => match decode_text(text) {
            DecodedText::Payload(payload) => normalize_payload(payload),
            DecodedText::Plain => NormalizedResponse::scalar(text.trim().to_string()),
            DecodedText::Malformed => NormalizedResponse::fallback(),
        },
    }
}

fn normalize_payload(payload: StructuredPayload) -> NormalizedResponse {
    if payload.table.is_empty() {
        if payload.message.is_empty() {
            return NormalizedResponse::fallback();
        }
        return NormalizedResponse {
            message: payload.message,
            table: TableData::empty(),
        };
    }
    NormalizedResponse {
        message: payload.message,
        table: normalize_table(&payload.table),
    }
}

/// Stringify a scalar answer
///
/// Uses `Display`, which never emits scientific notation. Non-finite
/// values normalize to `0`, consistent with the missing-value rule for
/// table cells.
#[must_use]
pub fn stringify_scalar(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "0".to_string()
    }
}

/// Round to 2 decimal places, half away from zero
///
/// `f64::round` semantics scaled by 100: `0.005 -> 0.01`, `-0.005 -> -0.01`.
/// Ties are judged on the binary value, so decimals that only look like
/// ties (`2.675` stores as `2.67499…`) round by their true magnitude.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Canonicalize a tabular answer
///
/// - missing cells and non-finite numbers become `0.0`
/// - floats round to 2 decimal places (half away from zero)
/// - rows sort ascending by the first temporal column, when one exists
/// - temporal cells format as month-year for month-granularity values
///   (first of the month at midnight), otherwise as full date-times
#[must_use]
pub fn normalize_table(table: &TableData) -> TableData {
    let mut data: Vec<Vec<CellValue>> = table
        .data
        .iter()
        .map(|row| row.iter().map(round_cell).collect())
        .collect();

    if let Some(temporal) = table.first_temporal_column() {
        data.sort_by_key(|row| {
            // missing timestamps sort last
            row.get(temporal)
                .and_then(CellValue::as_timestamp)
                .map_or((1, NaiveDateTime::MIN), |ts| (0, ts))
        });
        for row in &mut data {
            if let Some(cell) = row.get_mut(temporal) {
                if let Some(ts) = cell.as_timestamp() {
                    *cell = CellValue::Text(format_timestamp(ts));
                }
            }
        }
    }
    // remaining temporal cells outside the sort column
    for row in &mut data {
        for cell in row.iter_mut() {
            if let Some(ts) = cell.as_timestamp() {
                *cell = CellValue::Text(ts.format(DATETIME_FORMAT).to_string());
            }
        }
    }

    TableData {
        columns: table.columns.clone(),
        data,
    }
}

fn round_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Null => CellValue::Number(0.0),
        CellValue::Number(v) if !v.is_finite() => CellValue::Number(0.0),
        CellValue::Number(v) => CellValue::Number(round2(*v)),
        other => other.clone(),
    }
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    let midnight = ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0;
    if midnight && ts.day() == 1 {
        ts.format(MONTH_YEAR_FORMAT).to_string()
    } else {
        ts.format(DATETIME_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn month(y: i32, m: u32) -> CellValue {
        CellValue::Timestamp(
            NaiveDate::from_ymd_opt(y, m, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn normalize_scalar() {
        let out = normalize(&RawAgentResult::Scalar(42.5), Classification::Scalar);
        assert_eq!(out.message, vec!["42.5".to_string()]);
        assert!(out.table.is_empty());
    }

    #[test]
    fn normalize_ambiguous_is_fixed_message() {
        let out = normalize(
            &RawAgentResult::from("Unfortunately nothing matched"),
            Classification::Ambiguous,
        );
        assert_eq!(
            out.message,
            vec!["Please review and modify the prompt with more specifics.".to_string()]
        );
        assert!(out.table.is_empty());
    }

    #[test]
    fn normalize_plain_text() {
        let out = normalize(
            &RawAgentResult::from("  The median is 7.  "),
            Classification::Scalar,
        );
        assert_eq!(out.message, vec!["The median is 7.".to_string()]);
    }

    #[test]
    fn stringify_never_scientific() {
        let rendered = stringify_scalar(1.5e21);
        assert!(!rendered.contains('e') && !rendered.contains('E'));
        assert_eq!(stringify_scalar(f64::NAN), "0");
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(-0.005), -0.01);
        assert_eq!(round2(1.239), 1.24);
        // 2.675 stores below the decimal tie, so it rounds down
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(10.0), 10.0);
    }

    #[test]
    fn normalize_table_fills_and_rounds() {
        let table = TableData::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Null, CellValue::Number(1.456)],
                vec![CellValue::Number(f64::NAN), CellValue::Number(2.0)],
            ],
        )
        .unwrap();
        let out = normalize_table(&table);
        assert_eq!(out.data[0], vec![CellValue::Number(0.0), CellValue::Number(1.46)]);
        assert_eq!(out.data[1], vec![CellValue::Number(0.0), CellValue::Number(2.0)]);
    }

    #[test]
    fn normalize_table_sorts_and_formats_months() {
        let table = TableData::new(
            vec!["month".into(), "sales".into()],
            vec![
                vec![month(2024, 3), CellValue::Number(30.0)],
                vec![month(2024, 1), CellValue::Number(10.0)],
                vec![CellValue::Null, CellValue::Number(0.5)],
                vec![month(2024, 2), CellValue::Number(20.0)],
            ],
        )
        .unwrap();
        let out = normalize_table(&table);
        assert_eq!(out.data[0][0], CellValue::Text("Jan-2024".into()));
        assert_eq!(out.data[1][0], CellValue::Text("Feb-2024".into()));
        assert_eq!(out.data[2][0], CellValue::Text("Mar-2024".into()));
        // the filled null sorts last
        assert_eq!(out.data[3][0], CellValue::Number(0.0));
    }

    #[test]
    fn normalize_table_formats_datetimes() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let table = TableData::new(
            vec!["when".into(), "v".into()],
            vec![vec![CellValue::Timestamp(ts), CellValue::Int(1)]],
        )
        .unwrap();
        let out = normalize_table(&table);
        assert_eq!(out.data[0][0], CellValue::Text("2024-01-15 09:30:00".into()));
    }

    #[test]
    fn normalize_embedded_payload_table() {
        let text = r#"{"table": {"columns": ["v"], "data": [[null], [1.239]]}, "message": []}"#;
        let out = normalize(&RawAgentResult::from(text), Classification::Tabular);
        assert!(out.message.is_empty());
        assert_eq!(out.table.data[0], vec![CellValue::Number(0.0)]);
        assert_eq!(out.table.data[1], vec![CellValue::Number(1.24)]);
    }

    #[test]
    fn normalize_empty_payload_degrades() {
        let out = normalize(
            &RawAgentResult::from(r#"{"table": {}, "message": []}"#),
            Classification::Scalar,
        );
        assert_eq!(out, NormalizedResponse::fallback());
    }
}

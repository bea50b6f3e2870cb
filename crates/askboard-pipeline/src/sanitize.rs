//! Pseudo-JSON sanitization
//!
//! Analytic agents emit JSON wrapped in markdown fences, with Python-style
//! boolean and null literals, or not at all. This module is the single
//! recovery point: strip fences, fix literal casing, then parse with a
//! strict JSON parser. Agent text is never executed or evaluated.

use askboard_dataset::TableData;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-zA-Z]*").expect("static pattern compiles"));
static PYTHON_TRUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bTrue\b").expect("static pattern compiles"));
static PYTHON_FALSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bFalse\b").expect("static pattern compiles"));
static PYTHON_NONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bNone\b").expect("static pattern compiles"));

/// Remove markdown code fences (with or without a language tag)
#[must_use]
pub fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").into_owned()
}

/// Rewrite Python literals into their JSON forms
#[must_use]
pub fn fix_literals(text: &str) -> String {
    let text = PYTHON_TRUE.replace_all(text, "true");
    let text = PYTHON_FALSE.replace_all(&text, "false");
    PYTHON_NONE.replace_all(&text, "null").into_owned()
}

/// Whether sanitized text is shaped like a JSON document
#[must_use]
pub fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Sanitize then strictly parse agent text into a typed value
///
/// # Errors
/// Returns the underlying parse error; callers treat it as malformed agent
/// output and degrade, never evaluate.
pub fn parse_lenient<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let sanitized = fix_literals(&strip_fences(text));
    serde_json::from_str(sanitized.trim())
}

/// The structured `{message, table}` payload the query instruction pins
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StructuredPayload {
    /// Ordered response messages
    #[serde(default)]
    pub message: Vec<String>,
    /// Tabular answer, possibly empty
    #[serde(default)]
    pub table: TableData,
}

/// Outcome of decoding free agent text
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedText {
    /// A well-formed structured payload
    Payload(StructuredPayload),
    /// JSON-shaped text that failed strict parsing or shape validation
    Malformed,
    /// Ordinary prose with no structural claim
    Plain,
}

/// Decode agent text into a structured payload when it claims to be one
///
/// Text that does not look like JSON is [`DecodedText::Plain`]. JSON-shaped
/// text that fails parsing, or whose table violates the shape invariant, is
/// [`DecodedText::Malformed`] — downstream treats that as an ambiguous
/// answer.
#[must_use]
pub fn decode_text(text: &str) -> DecodedText {
    let stripped = strip_fences(text);
    if !looks_like_json(&stripped) {
        return DecodedText::Plain;
    }
    match serde_json::from_str::<StructuredPayload>(fix_literals(&stripped).trim()) {
        Ok(payload) if payload.table.validate().is_ok() => DecodedText::Payload(payload),
        Ok(_) | Err(_) => DecodedText::Malformed,
    }
}

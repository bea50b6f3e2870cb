//! Canonical response envelope
//!
//! The normalized, wire-stable response shape returned to every caller
//! regardless of the internal result type, and the request shape that
//! produces it. Field order is the wire order.

use crate::chart::Chart;
use crate::insights::InsightAnswers;
use askboard_dataset::TableData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status code carried by successful envelopes.
pub const STATUS_OK: u16 = 200;

/// Stable detail string carried by successful envelopes.
pub const DETAIL_SUCCESS: &str = "Prompt Run Successfully";

/// An inbound query against a board's datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's natural-language prompt
    pub prompt_text: String,
    /// Opaque board reference, echoed into the envelope
    pub board_id: String,
    /// Requesting user, echoed into the envelope
    pub user_name: String,
    /// Whether a cached envelope may satisfy the request
    pub use_cache: bool,
}

impl QueryRequest {
    /// Create a request with caching enabled and no user attribution
    #[inline]
    #[must_use]
    pub fn new(prompt_text: impl Into<String>, board_id: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            board_id: board_id.into(),
            user_name: String::new(),
            use_cache: true,
        }
    }

    /// With user attribution
    #[inline]
    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    /// With caching enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

/// The canonical, cacheable pipeline response
///
/// # Invariants
/// - `table` is either completely empty or every row matches the column
///   count (enforced upstream by [`TableData`]).
/// - Immutable after the cache write; cached envelopes are returned as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// HTTP-style status code (200 on any best-effort success)
    pub status_code: u16,
    /// Stable outcome description
    pub detail: String,
    /// Wall-clock run start (ISO-8601 on the wire)
    pub start_time: DateTime<Utc>,
    /// Wall-clock run end (ISO-8601 on the wire)
    pub end_time: DateTime<Utc>,
    /// Elapsed seconds between start and end
    pub duration_seconds: f64,
    /// Board reference the query ran against
    pub board_id: String,
    /// The raw prompt text, for auditability
    pub prompt_text: String,
    /// Ordered response messages
    pub message: Vec<String>,
    /// Canonical table, possibly empty
    pub table: TableData,
    /// Chart recommendations, present only when graph synthesis succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charts: Option<Vec<Chart>>,
    /// Follow-up insight answers, present only when enabled and successful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<InsightAnswers>,
    /// Requesting user
    pub user_name: String,
}

//! Graph synthesis
//!
//! Derives chart recommendations from a normalized tabular answer through a
//! second agent invocation. Strictly best-effort: any failure — agent
//! error, non-text output, unparseable payload — degrades to `None` and
//! never fails the pipeline.

use crate::chart::{Chart, ChartsPayload};
use crate::sanitize;
use askboard_agent::instructions::graph_instruction;
use askboard_agent::AnalyticAgentSession;
use askboard_dataset::TableData;

/// Best-effort chart derivation over tabular answers
#[derive(Debug, Clone)]
pub struct GraphSynthesizer {
    session: AnalyticAgentSession,
}

impl GraphSynthesizer {
    /// Create a synthesizer over an agent session
    #[inline]
    #[must_use]
    pub fn new(session: AnalyticAgentSession) -> Self {
        Self { session }
    }

    /// Derive chart recommendations for a table
    ///
    /// Preconditions: the table must be non-empty and have at least two
    /// columns (first treated as label/index, remainder as series).
    /// Returns `None` when preconditions fail or any stage of the
    /// derivation does.
    pub async fn synthesize(&self, table: &TableData) -> Option<Vec<Chart>> {
        if table.is_empty() || table.column_count() < 2 {
            return None;
        }
        let instruction = graph_instruction(&table.to_markdown());
        let raw = match self.session.run_direct(&instruction, &[]).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("graph synthesis agent call failed: {err}");
                return None;
            }
        };
        let Some(text) = raw.as_text() else {
            tracing::warn!("graph synthesis returned a non-text result");
            return None;
        };
        match sanitize::parse_lenient::<ChartsPayload>(text) {
            Ok(payload) if payload.charts.is_empty() => None,
            Ok(payload) => {
                tracing::info!(charts = payload.charts.len(), "graph generation succeeded");
                Some(payload.charts)
            }
            Err(err) => {
                tracing::warn!("graph payload parse failed: {err}");
                None
            }
        }
    }
}

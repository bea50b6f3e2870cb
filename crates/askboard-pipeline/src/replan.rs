//! Query replanning
//!
//! Rewrites an ambiguous query into a more constrained planner instruction
//! for one bounded re-invocation of the agent. The budget is deliberately
//! small: the rewrite is not guaranteed to converge, and every retry costs
//! a full agent invocation.

use askboard_agent::instructions::{planner_instruction, planner_instruction_with_preview};
use askboard_dataset::Dataset;

/// Replan attempts permitted per pipeline run.
///
/// A second ambiguous classification after replanning degrades to the fixed
/// fallback message instead of retrying again.
pub const REPLAN_BUDGET: u32 = 1;

/// The replanning stage
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplanStage {
    preview_rows: Option<usize>,
}

impl ReplanStage {
    /// Create a replan stage without data previews
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Include a markdown preview of the first `rows` dataset rows in the
    /// rewritten instruction
    #[inline]
    #[must_use]
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Rewrite the original query into a planner instruction
    ///
    /// Always starts from the user's original prompt, not the previous
    /// instruction, so repeated wrapping cannot compound.
    #[must_use]
    pub fn rewrite(&self, prompt: &str, datasets: &[Dataset]) -> String {
        match self.preview_rows {
            Some(rows) if !datasets.is_empty() => {
                let preview: Vec<String> =
                    datasets.iter().map(|ds| ds.to_markdown(rows)).collect();
                planner_instruction_with_preview(prompt, &preview.join("\n"))
            }
            _ => planner_instruction(prompt),
        }
    }
}

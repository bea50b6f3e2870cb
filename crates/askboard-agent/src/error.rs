//! Error types for the analytic agent interface

/// Errors from an analytic agent invocation
///
/// An execution failure is distinct from an ambiguous answer: the latter is
/// a valid (if low-quality) result and never surfaces as an error here.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent's internal reasoning or generated execution failed outright
    #[error("agent execution failed: {0}")]
    ExecutionFailed(String),

    /// The agent could not be reached or answered with an unusable frame
    #[error("agent interface error: {0}")]
    Interface(String),

    /// Instruction rephrasing failed
    ///
    /// Callers fall back to the original instruction text; see
    /// [`AnalyticAgentSession::run`](crate::session::AnalyticAgentSession::run).
    #[error("instruction rephrasing failed: {0}")]
    RephraseFailed(String),
}

impl AgentError {
    /// Whether a fresh invocation could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExecutionFailed(_) | Self::Interface(_))
    }
}

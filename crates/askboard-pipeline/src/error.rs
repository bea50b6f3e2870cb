//! Error types for the query pipeline
//!
//! Only agent execution failures (including timeouts) and fatal store
//! errors propagate to callers; ambiguity, graph synthesis failures, and
//! cache unavailability all resolve to a best-effort response envelope.

use crate::store::StoreError;
use askboard_agent::AgentError;
use std::sync::Arc;

/// Stable detail string carried by user-visible failures.
pub const DETAIL_ERROR: &str = "Internal Server Error";

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The analytic agent failed outright
    #[error("agent execution failed: {0}")]
    Agent(#[from] AgentError),

    /// The analytic agent did not answer within the configured timeout
    #[error("agent invocation timed out after {timeout_secs}s")]
    AgentTimeout {
        /// Configured timeout in seconds
        timeout_secs: u64,
    },

    /// The response store failed fatally
    #[error("response store failed: {0}")]
    Store(#[from] StoreError),

    /// The computing run was cancelled before producing a result
    #[error("run cancelled before completion")]
    Cancelled,

    /// A failure shared across coalesced callers of one fingerprint
    #[error(transparent)]
    Shared(#[from] Arc<PipelineError>),
}

impl PipelineError {
    /// HTTP-style status code for the failure
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> u16 {
        500
    }

    /// Stable user-visible detail string
    #[inline]
    #[must_use]
    pub fn detail(&self) -> &'static str {
        DETAIL_ERROR
    }

    /// Whether the failure originates in the analytic agent
    #[must_use]
    pub fn is_agent_failure(&self) -> bool {
        match self {
            Self::Agent(_) | Self::AgentTimeout { .. } => true,
            Self::Shared(inner) => inner.is_agent_failure(),
            Self::Store(_) | Self::Cancelled => false,
        }
    }
}

//! Analytic agent sessions
//!
//! [`AnalyticAgent`] is the seam to the external analytic capability: an
//! instruction plus datasets in, a loosely-typed result out. What the agent
//! does internally to answer (sort, filter, aggregate) is opaque to the
//! pipeline. [`AnalyticAgentSession`] wraps an agent with per-run options
//! and the rephrase-before-run convention.

use crate::error::AgentError;
use crate::result::RawAgentResult;
use askboard_dataset::Dataset;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options forwarded to the agent on every invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Internal retry budget the agent may spend on its own execution
    pub max_retries: u32,
    /// Whether the agent may reuse its own answer cache
    pub enable_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_retries: 10,
            enable_cache: false,
        }
    }
}

/// The external analytic capability
///
/// Implementations accept a natural-language instruction and one or more
/// tabular datasets and return a loosely-typed result. Each invocation is
/// stateless with respect to prior invocations in the same pipeline run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticAgent: Send + Sync {
    /// Execute an instruction against the given datasets
    ///
    /// # Errors
    /// Returns [`AgentError`] when the underlying reasoning or execution
    /// fails entirely. An ambiguous answer is not an error; it comes back
    /// as a valid [`RawAgentResult`].
    async fn run(
        &self,
        instruction: &str,
        datasets: &[Dataset],
        options: &RunOptions,
    ) -> Result<RawAgentResult, AgentError>;

    /// Normalize the phrasing of an instruction
    ///
    /// # Errors
    /// Returns [`AgentError`] when rephrasing fails; callers fall back to
    /// the original instruction text.
    async fn rephrase(&self, instruction: &str) -> Result<String, AgentError>;
}

/// Session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Options forwarded to every agent invocation
    pub options: RunOptions,
    /// Whether to rephrase instructions before running them
    pub rephrase: bool,
}

impl SessionConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With the agent-internal retry budget
    #[inline]
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    /// With the agent-side answer cache enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_agent_cache(mut self, enable: bool) -> Self {
        self.options.enable_cache = enable;
        self
    }

    /// With rephrasing enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_rephrase(mut self, rephrase: bool) -> Self {
        self.rephrase = rephrase;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            options: RunOptions::default(),
            rephrase: true,
        }
    }
}

/// Stateful wrapper around an analytic agent
///
/// Applies the session's run options and, when enabled, a rephrase pass
/// immediately before execution. Cheap to clone; clones share the agent.
#[derive(Clone)]
pub struct AnalyticAgentSession {
    agent: Arc<dyn AnalyticAgent>,
    config: SessionConfig,
}

impl AnalyticAgentSession {
    /// Create a session over an agent
    #[inline]
    #[must_use]
    pub fn new(agent: Arc<dyn AnalyticAgent>, config: SessionConfig) -> Self {
        Self { agent, config }
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Rephrase then run an instruction
    ///
    /// A rephrasing failure is logged and the original instruction text is
    /// used unchanged.
    ///
    /// # Errors
    /// Returns [`AgentError`] only for execution failures.
    pub async fn run(
        &self,
        instruction: &str,
        datasets: &[Dataset],
    ) -> Result<RawAgentResult, AgentError> {
        let instruction = if self.config.rephrase {
            match self.agent.rephrase(instruction).await {
                Ok(rephrased) => rephrased,
                Err(err) => {
                    tracing::warn!("rephrase failed, using original instruction: {err}");
                    instruction.to_string()
                }
            }
        } else {
            instruction.to_string()
        };
        self.agent
            .run(&instruction, datasets, &self.config.options)
            .await
    }

    /// Run an instruction verbatim, skipping the rephrase pass
    ///
    /// Used by secondary derivations (graph synthesis, insight questions)
    /// whose instructions are already fully constrained.
    ///
    /// # Errors
    /// Returns [`AgentError`] for execution failures.
    pub async fn run_direct(
        &self,
        instruction: &str,
        datasets: &[Dataset],
    ) -> Result<RawAgentResult, AgentError> {
        self.agent
            .run(instruction, datasets, &self.config.options)
            .await
    }
}

impl fmt::Debug for AnalyticAgentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticAgentSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! Pipeline orchestration
//!
//! Drives the stage sequence for one query run: cache check, agent
//! execution, classification, bounded replanning, normalization, graph
//! synthesis, cache write. Owns nothing global — the store and agent
//! session are injected at construction.

use crate::classify::{classify, Classification};
use crate::envelope::{QueryRequest, ResponseEnvelope, DETAIL_SUCCESS, STATUS_OK};
use crate::error::PipelineError;
use crate::graph::GraphSynthesizer;
use crate::insights::InsightGenerator;
use crate::normalize::normalize;
use crate::replan::{ReplanStage, REPLAN_BUDGET};
use crate::single_flight::SingleFlight;
use crate::store::ResponseStore;
use askboard_agent::instructions::query_instruction;
use askboard_agent::{AnalyticAgentSession, RawAgentResult};
use askboard_dataset::{Dataset, Fingerprint};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use ulid::Ulid;

/// Pipeline configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on one analytic agent invocation
    pub agent_timeout: Duration,
    /// Replan attempts permitted per run
    pub replan_budget: u32,
    /// Whether to derive follow-up insight answers for tabular results
    pub generate_insights: bool,
}

impl PipelineConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With the agent invocation timeout
    #[inline]
    #[must_use]
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// With the replan budget
    #[inline]
    #[must_use]
    pub fn with_replan_budget(mut self, budget: u32) -> Self {
        self.replan_budget = budget;
        self
    }

    /// With insight generation enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_insights(mut self, enabled: bool) -> Self {
        self.generate_insights = enabled;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(120),
            replan_budget: REPLAN_BUDGET,
            generate_insights: false,
        }
    }
}

/// The query execution pipeline
///
/// Runs are independent and may execute concurrently across different
/// fingerprints; identical fingerprints coalesce onto one execution.
#[derive(Debug)]
pub struct QueryPipeline {
    config: PipelineConfig,
    session: AnalyticAgentSession,
    store: Arc<dyn ResponseStore>,
    replan: ReplanStage,
    graph: GraphSynthesizer,
    insights: InsightGenerator,
    flights: SingleFlight,
}

impl QueryPipeline {
    /// Create a pipeline over an agent session and a response store
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        session: AnalyticAgentSession,
        store: Arc<dyn ResponseStore>,
    ) -> Self {
        Self {
            config,
            graph: GraphSynthesizer::new(session.clone()),
            insights: InsightGenerator::new(session.clone()),
            session,
            store,
            replan: ReplanStage::new(),
            flights: SingleFlight::new(),
        }
    }

    /// With a replan stage carrying dataset previews
    #[inline]
    #[must_use]
    pub fn with_replan_stage(mut self, replan: ReplanStage) -> Self {
        self.replan = replan;
        self
    }

    /// Pipeline configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one query against the given datasets
    ///
    /// Resolves to a best-effort envelope for every recognized answer
    /// shape. Wall-clock timing is recorded on every path.
    ///
    /// # Errors
    /// Returns [`PipelineError`] only when the analytic agent fails
    /// outright or times out; such runs are never cached.
    pub async fn run_query(
        &self,
        request: QueryRequest,
        datasets: &[Dataset],
    ) -> Result<ResponseEnvelope, PipelineError> {
        let run_id = Ulid::new();
        let fingerprint = Fingerprint::of_query(datasets, &request.prompt_text);
        tracing::info!(
            run = %run_id,
            fingerprint = %fingerprint.short(),
            board = %request.board_id,
            "query received"
        );

        if request.use_cache {
            if let Some(envelope) = self.cached(&fingerprint).await {
                tracing::info!(run = %run_id, "using cached response");
                return Ok(envelope);
            }
        }

        self.flights
            .run(fingerprint, || self.execute(&request, datasets, fingerprint))
            .await
    }

    /// Execute the full stage sequence for a cache miss
    async fn execute(
        &self,
        request: &QueryRequest,
        datasets: &[Dataset],
        fingerprint: Fingerprint,
    ) -> Result<ResponseEnvelope, PipelineError> {
        let start = Utc::now();

        // A coalesced predecessor may have completed between the fast-path
        // lookup and flight acquisition.
        if request.use_cache {
            if let Some(envelope) = self.cached(&fingerprint).await {
                return Ok(envelope);
            }
        }

        let mut instruction = query_instruction(&request.prompt_text);
        let mut replans_left = self.config.replan_budget;
        let (raw, classification) = loop {
            let raw = self.invoke(&instruction, datasets).await?;
            let classification = classify(&raw);
            if classification == Classification::Ambiguous && replans_left > 0 {
                replans_left -= 1;
                tracing::info!("ambiguous answer, replanning query");
                instruction = self.replan.rewrite(&request.prompt_text, datasets);
                continue;
            }
            break (raw, classification);
        };

        let normalized = normalize(&raw, classification);

        let charts = if normalized.table.is_empty() {
            None
        } else {
            self.graph.synthesize(&normalized.table).await
        };
        let insights = if self.config.generate_insights && !normalized.table.is_empty() {
            self.insights.generate(&normalized.table).await
        } else {
            None
        };

        let end = Utc::now();
        let envelope = ResponseEnvelope {
            status_code: STATUS_OK,
            detail: DETAIL_SUCCESS.to_string(),
            start_time: start,
            end_time: end,
            duration_seconds: (end - start).to_std().map_or(0.0, |d| d.as_secs_f64()),
            board_id: request.board_id.clone(),
            prompt_text: request.prompt_text.clone(),
            message: normalized.message,
            table: normalized.table,
            charts,
            insights,
            user_name: request.user_name.clone(),
        };

        if let Err(err) = self.store.store(fingerprint, &envelope).await {
            tracing::warn!("response not cached, store degraded: {err}");
        }

        Ok(envelope)
    }

    /// Look up a cached envelope, degrading on store failure
    async fn cached(&self, fingerprint: &Fingerprint) -> Option<ResponseEnvelope> {
        match self.store.lookup(fingerprint).await {
            Ok(Some(entry)) => Some(entry.envelope),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("cache lookup failed, proceeding uncached: {err}");
                None
            }
        }
    }

    /// Invoke the agent session under the configured timeout
    async fn invoke(
        &self,
        instruction: &str,
        datasets: &[Dataset],
    ) -> Result<RawAgentResult, PipelineError> {
        match tokio::time::timeout(
            self.config.agent_timeout,
            self.session.run(instruction, datasets),
        )
        .await
        {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(err)) => Err(PipelineError::Agent(err)),
            Err(_) => Err(PipelineError::AgentTimeout {
                timeout_secs: self.config.agent_timeout.as_secs(),
            }),
        }
    }
}

//! End-to-end pipeline tests
//!
//! Drives the full stage sequence with scripted agents: classification,
//! bounded replanning, normalization, graph synthesis, caching, and
//! single-flight coalescing.

use askboard_agent::{AgentError, AnalyticAgentSession, RawAgentResult, SessionConfig};
use askboard_dataset::{CellValue, Fingerprint};
use askboard_pipeline::{
    CacheEntry, MemoryStore, PipelineConfig, PipelineError, QueryPipeline, QueryRequest,
    ResponseEnvelope, ResponseStore, StoreError, FALLBACK_MESSAGE,
};
use askboard_test_utils::{
    chart_reply_json, raw_sales_table, region_sales_table, sales_by_month_dataset, ScriptedAgent,
};
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("askboard_pipeline=debug")
        .with_test_writer()
        .try_init();
}

fn pipeline_with(
    agent: ScriptedAgent,
    config: PipelineConfig,
) -> (Arc<QueryPipeline>, Arc<ScriptedAgent>, Arc<MemoryStore>) {
    let agent = Arc::new(agent);
    let store = Arc::new(MemoryStore::default());
    let session = AnalyticAgentSession::new(agent.clone(), SessionConfig::new());
    let pipeline = Arc::new(QueryPipeline::new(config, session, store.clone()));
    (pipeline, agent, store)
}

#[tokio::test]
async fn tabular_answer_is_normalized_and_charted() -> anyhow::Result<()> {
    init_tracing();
    let agent = ScriptedAgent::new()
        .with_reply(raw_sales_table())
        .with_reply(chart_reply_json());
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let envelope = pipeline
        .run_query(
            QueryRequest::new("total sales by month", "board-7").with_user_name("ada"),
            &datasets,
        )
        .await?;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.detail, "Prompt Run Successfully");
    assert!(envelope.message.is_empty());

    // Sorted ascending by month, month-year formatted, nulls zeroed,
    // floats rounded to 2 decimal places.
    assert_eq!(envelope.table.columns, vec!["month", "sales"]);
    assert_eq!(
        envelope.table.data[0],
        vec![CellValue::Text("Jan-2024".into()), CellValue::Number(1200.46)]
    );
    assert_eq!(
        envelope.table.data[1],
        vec![CellValue::Text("Feb-2024".into()), CellValue::Number(0.0)]
    );
    assert_eq!(
        envelope.table.data[2],
        vec![CellValue::Text("Mar-2024".into()), CellValue::Number(1800.0)]
    );

    let charts = envelope.charts.as_ref().expect("charts synthesized");
    assert_eq!(charts.len(), 3);

    // One query invocation plus one graph invocation.
    assert_eq!(agent.run_calls(), 2);

    let wire = serde_json::to_string(&envelope)?;
    assert!(wire.contains("1200.46"));
    assert!(!wire.to_lowercase().contains("1200.46e"));
    Ok(())
}

#[tokio::test]
async fn ambiguous_answer_replans_once_then_degrades() -> anyhow::Result<()> {
    init_tracing();
    let agent = ScriptedAgent::new()
        .with_reply("Unfortunately, no rows match that filter.")
        .with_reply("No data available for the given conditions.");
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let envelope = pipeline
        .run_query(
            QueryRequest::new("irrelevant filter on nonexistent column", "board-7"),
            &datasets,
        )
        .await?;

    assert_eq!(
        envelope.message,
        vec!["Please review and modify the prompt with more specifics.".to_string()]
    );
    assert_eq!(envelope.message[0], FALLBACK_MESSAGE);
    assert!(envelope.table.is_empty());
    assert!(envelope.charts.is_none());

    // Exactly one replan: two agent invocations, never a third.
    assert_eq!(agent.run_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn ambiguous_then_tabular_recovers_via_replan() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new()
        .with_reply("Unfortunately, I could not answer that directly.")
        .with_reply(region_sales_table())
        .with_reply(chart_reply_json());
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let envelope = pipeline
        .run_query(
            QueryRequest::new("sales by region", "board-7"),
            &[sales_by_month_dataset()],
        )
        .await?;

    assert_eq!(envelope.table.row_count(), 2);
    assert!(envelope.charts.is_some());
    assert_eq!(agent.run_calls(), 3);
    Ok(())
}

#[tokio::test]
async fn scalar_answer_skips_graph_synthesis() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new().with_reply(RawAgentResult::Scalar(42.5));
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let envelope = pipeline
        .run_query(
            QueryRequest::new("average price", "board-7"),
            &[sales_by_month_dataset()],
        )
        .await?;

    assert_eq!(envelope.message, vec!["42.5".to_string()]);
    assert!(envelope.table.is_empty());
    assert!(envelope.charts.is_none());
    // No second invocation for graph synthesis on an empty table.
    assert_eq!(agent.run_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn cached_envelope_is_returned_unchanged() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new().with_reply(RawAgentResult::Scalar(42.5));
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let request = QueryRequest::new("average price", "board-7");

    let first = pipeline.run_query(request.clone(), &datasets).await?;
    let second = pipeline.run_query(request, &datasets).await?;

    assert_eq!(first.table, second.table);
    assert_eq!(first.message, second.message);
    assert_eq!(first, second);
    assert_eq!(agent.run_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn cache_disabled_reexecutes_but_still_stores() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new()
        .with_reply(RawAgentResult::Scalar(1.0))
        .with_reply(RawAgentResult::Scalar(2.0));
    let (pipeline, agent, store) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let uncached = QueryRequest::new("count rows", "board-7").with_cache(false);

    let first = pipeline.run_query(uncached.clone(), &datasets).await?;
    let second = pipeline.run_query(uncached, &datasets).await?;
    assert_eq!(first.message, vec!["1".to_string()]);
    assert_eq!(second.message, vec!["2".to_string()]);
    assert_eq!(agent.run_calls(), 2);

    // The last run was still persisted for cache-enabled callers.
    let fingerprint = Fingerprint::of_query(&datasets, "count rows");
    let entry = store.lookup(&fingerprint).await?.expect("stored");
    assert_eq!(entry.envelope.message, vec!["2".to_string()]);
    Ok(())
}

#[tokio::test]
async fn concurrent_identical_requests_single_flight() -> anyhow::Result<()> {
    init_tracing();
    let agent = ScriptedAgent::new()
        .with_delay(Duration::from_millis(100))
        .with_reply(RawAgentResult::Scalar(42.5));
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let request = QueryRequest::new("average price", "board-7");

    let a = {
        let pipeline = pipeline.clone();
        let request = request.clone();
        let datasets = datasets.clone();
        tokio::spawn(async move { pipeline.run_query(request, &datasets).await })
    };
    let b = {
        let pipeline = pipeline.clone();
        let datasets = datasets.clone();
        tokio::spawn(async move { pipeline.run_query(request, &datasets).await })
    };

    let first = a.await??;
    let second = b.await??;

    // Exactly one agent invocation; both callers see the same envelope.
    assert_eq!(agent.run_calls(), 1);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn agent_failure_propagates_and_is_not_cached() {
    let agent = ScriptedAgent::new()
        .with_error(AgentError::ExecutionFailed("code generation failed".into()))
        .with_reply(RawAgentResult::Scalar(7.0));
    let (pipeline, _, store) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let request = QueryRequest::new("total sales", "board-7");

    let err = pipeline
        .run_query(request.clone(), &datasets)
        .await
        .unwrap_err();
    assert!(err.is_agent_failure());
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.detail(), "Internal Server Error");

    let fingerprint = Fingerprint::of_query(&datasets, "total sales");
    assert!(store.lookup(&fingerprint).await.unwrap().is_none());

    // A later identical request runs fresh and succeeds.
    let envelope = pipeline.run_query(request, &datasets).await.unwrap();
    assert_eq!(envelope.message, vec!["7".to_string()]);
}

#[tokio::test]
async fn agent_timeout_fails_the_run() {
    let agent = ScriptedAgent::new()
        .with_delay(Duration::from_millis(200))
        .with_reply(RawAgentResult::Scalar(1.0));
    let config = PipelineConfig::new().with_agent_timeout(Duration::from_millis(20));
    let (pipeline, _, store) = pipeline_with(agent, config);

    let datasets = vec![sales_by_month_dataset()];
    let err = pipeline
        .run_query(QueryRequest::new("slow query", "board-7"), &datasets)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Shared(_) | PipelineError::AgentTimeout { .. }
    ));
    assert!(err.is_agent_failure());

    let fingerprint = Fingerprint::of_query(&datasets, "slow query");
    assert!(store.lookup(&fingerprint).await.unwrap().is_none());
}

#[tokio::test]
async fn rephrase_failure_falls_back_to_original_instruction() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new()
        .with_failing_rephrase()
        .with_reply(RawAgentResult::Scalar(3.0));
    let (pipeline, agent, _) = pipeline_with(agent, PipelineConfig::new());

    let envelope = pipeline
        .run_query(
            QueryRequest::new("row count", "board-7"),
            &[sales_by_month_dataset()],
        )
        .await?;

    assert_eq!(envelope.message, vec!["3".to_string()]);
    assert_eq!(agent.rephrase_calls(), 1);
    Ok(())
}

#[derive(Debug)]
struct FailingStore;

#[async_trait::async_trait]
impl ResponseStore for FailingStore {
    async fn lookup(&self, _: &Fingerprint) -> Result<Option<CacheEntry>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    async fn store(&self, _: Fingerprint, _: &ResponseEnvelope) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }
}

#[tokio::test]
async fn degraded_store_still_returns_envelope() -> anyhow::Result<()> {
    init_tracing();
    let agent = Arc::new(ScriptedAgent::new().with_reply(RawAgentResult::Scalar(9.0)));
    let session = AnalyticAgentSession::new(agent.clone(), SessionConfig::new());
    let pipeline = QueryPipeline::new(PipelineConfig::new(), session, Arc::new(FailingStore));

    let envelope = pipeline
        .run_query(
            QueryRequest::new("total", "board-7"),
            &[sales_by_month_dataset()],
        )
        .await?;

    assert_eq!(envelope.message, vec!["9".to_string()]);
    Ok(())
}

#[tokio::test]
async fn stored_envelope_roundtrips_through_serde() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new()
        .with_reply(region_sales_table())
        .with_reply(chart_reply_json());
    let (pipeline, _, store) = pipeline_with(agent, PipelineConfig::new());

    let datasets = vec![sales_by_month_dataset()];
    let envelope = pipeline
        .run_query(QueryRequest::new("sales by region", "board-7"), &datasets)
        .await?;

    let fingerprint = Fingerprint::of_query(&datasets, "sales by region");
    let entry = store.lookup(&fingerprint).await?.expect("stored");
    assert_eq!(entry.envelope, envelope);

    // The persisted blob is an opaque structured value that decodes back
    // to an equal envelope.
    let blob = serde_json::to_string(&entry.envelope)?;
    let decoded: ResponseEnvelope = serde_json::from_str(&blob)?;
    assert_eq!(decoded.table, envelope.table);
    assert_eq!(decoded.message, envelope.message);
    assert_eq!(decoded.charts, envelope.charts);
    Ok(())
}

#[tokio::test]
async fn insights_generated_when_enabled() -> anyhow::Result<()> {
    let agent = ScriptedAgent::new()
        .with_reply(region_sales_table())
        .with_reply(chart_reply_json())
        .with_reply("```json\n[\"Which region leads?\"]\n```")
        .with_reply(RawAgentResult::from("The north region leads."));
    let config = PipelineConfig::new().with_insights(true);
    let (pipeline, agent, _) = pipeline_with(agent, config);

    let envelope = pipeline
        .run_query(
            QueryRequest::new("sales by region", "board-7"),
            &[sales_by_month_dataset()],
        )
        .await?;

    let insights = envelope.insights.as_ref().expect("insights generated");
    assert_eq!(insights["Which region leads?"], "The north region leads.");
    assert_eq!(agent.run_calls(), 4);
    Ok(())
}

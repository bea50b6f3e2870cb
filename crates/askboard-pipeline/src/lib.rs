//! Askboard Pipeline - query execution and response normalization
//!
//! Takes a raw query, already-materialized datasets, and an analytic agent
//! session, and produces a canonical, cacheable, chart-annotated response
//! envelope:
//! - Content-addressed response caching ([`store`])
//! - Classification of heterogeneous answer shapes ([`classify`])
//! - Bounded replanning of ambiguous queries ([`replan`])
//! - Canonical normalization of messages and tables ([`normalize`])
//! - Best-effort chart derivation ([`graph`])
//! - Per-fingerprint single-flight execution ([`single_flight`])
//!
//! # Example
//!
//! ```rust,ignore
//! use askboard_pipeline::{MemoryStore, PipelineConfig, QueryPipeline, QueryRequest};
//! use std::sync::Arc;
//!
//! let pipeline = QueryPipeline::new(
//!     PipelineConfig::new(),
//!     session,
//!     Arc::new(MemoryStore::default()),
//! );
//! let envelope = pipeline
//!     .run_query(QueryRequest::new("total sales by month", "board-7"), &datasets)
//!     .await?;
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod chart;
pub mod classify;
pub mod envelope;
pub mod error;
pub mod graph;
pub mod insights;
pub mod normalize;
pub mod orchestrator;
pub mod replan;
pub mod sanitize;
pub mod single_flight;
pub mod store;

// Re-exports for convenience
pub use chart::{Chart, ChartData, ChartKind, ChartValues};
pub use classify::{classify, looks_ambiguous, Classification, FAILURE_MARKERS};
pub use envelope::{QueryRequest, ResponseEnvelope, DETAIL_SUCCESS, STATUS_OK};
pub use error::{PipelineError, DETAIL_ERROR};
pub use graph::GraphSynthesizer;
pub use insights::{InsightAnswers, InsightGenerator};
pub use normalize::{normalize, NormalizedResponse, FALLBACK_MESSAGE};
pub use orchestrator::{PipelineConfig, QueryPipeline};
pub use replan::{ReplanStage, REPLAN_BUDGET};
pub use single_flight::SingleFlight;
pub use store::{CacheEntry, MemoryStore, ResponseStore, StoreError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the query pipeline
    pub use crate::{
        MemoryStore, PipelineConfig, PipelineError, QueryPipeline, QueryRequest, ResponseEnvelope,
        ResponseStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

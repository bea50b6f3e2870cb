//! Testing utilities for the askboard workspace
//!
//! Shared scripted agents and dataset fixtures.

#![allow(missing_docs)]

use askboard_agent::{AgentError, AnalyticAgent, RawAgentResult, RunOptions};
use askboard_dataset::{CellValue, Column, Dataset, TableData};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// An agent that replays a fixed script of results and errors
///
/// Counts `run` invocations so tests can assert how many agent calls a
/// pipeline path actually made (replan bounds, single-flight coalescing).
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    replies: Mutex<VecDeque<Result<RawAgentResult, AgentError>>>,
    run_calls: AtomicUsize,
    rephrase_calls: AtomicUsize,
    fail_rephrase: bool,
    delay: Option<Duration>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    #[must_use]
    pub fn with_reply(self, reply: impl Into<RawAgentResult>) -> Self {
        self.replies.lock().push_back(Ok(reply.into()));
        self
    }

    /// Queue an execution failure
    #[must_use]
    pub fn with_error(self, error: AgentError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    /// Make every rephrase call fail
    #[must_use]
    pub fn with_failing_rephrase(mut self) -> Self {
        self.fail_rephrase = true;
        self
    }

    /// Sleep before answering, to widen concurrency windows in tests
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `run` invocations observed
    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    /// Number of `rephrase` invocations observed
    pub fn rephrase_calls(&self) -> usize {
        self.rephrase_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticAgent for ScriptedAgent {
    async fn run(
        &self,
        _instruction: &str,
        _datasets: &[Dataset],
        _options: &RunOptions,
    ) -> Result<RawAgentResult, AgentError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Interface("script exhausted".to_string())))
    }

    async fn rephrase(&self, instruction: &str) -> Result<String, AgentError> {
        self.rephrase_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rephrase {
            Err(AgentError::RephraseFailed("scripted failure".to_string()))
        } else {
            Ok(instruction.to_string())
        }
    }
}

fn month_cell(year: i32, month: u32) -> CellValue {
    CellValue::Timestamp(
        NaiveDate::from_ymd_opt(year, month, 1)
            .expect("valid fixture date")
            .and_hms_opt(0, 0, 0)
            .expect("valid fixture time"),
    )
}

/// A dataset with a temporal month column and a numeric sales column
pub fn sales_by_month_dataset() -> Dataset {
    Dataset::new(
        "monthly_sales",
        vec![
            Column::new(
                "month",
                vec![month_cell(2024, 1), month_cell(2024, 2), month_cell(2024, 3)],
            ),
            Column::new(
                "sales",
                vec![
                    CellValue::from(1200.456),
                    CellValue::Null,
                    CellValue::from(1800.0),
                ],
            ),
        ],
    )
    .expect("valid fixture dataset")
}

/// A raw tabular agent answer over months: unsorted, with a missing value
/// and unrounded floats
pub fn raw_sales_table() -> TableData {
    TableData::new(
        vec!["month".to_string(), "sales".to_string()],
        vec![
            vec![month_cell(2024, 3), CellValue::from(1800.0)],
            vec![month_cell(2024, 1), CellValue::from(1200.456)],
            vec![month_cell(2024, 2), CellValue::Null],
        ],
    )
    .expect("valid fixture table")
}

/// A minimal two-column textual/numeric table without temporal data
pub fn region_sales_table() -> TableData {
    TableData::new(
        vec!["region".to_string(), "sales".to_string()],
        vec![
            vec![CellValue::from("north"), CellValue::from(60.0)],
            vec![CellValue::from("south"), CellValue::from(40.0)],
        ],
    )
    .expect("valid fixture table")
}

/// A chart reply the graph agent would produce for a two-column table
#[must_use]
pub fn chart_reply_json() -> &'static str {
    r#"```json
{
  "charts": [
    {
      "chart_type": "bar",
      "data_format": {
        "labels": ["north", "south"],
        "categories": ["sales"],
        "values": [[60.0], [40.0]],
        "isStacked": True
      },
      "insight": ["Bar chart showing the distribution of sales across regions."]
    },
    {
      "chart_type": "pie",
      "data_format": {
        "labels": ["north", "south"],
        "categories": ["sales"],
        "values": [60.0, 40.0],
        "isStacked": False
      },
      "insight": ["Pie chart showing the proportion of sales across regions."]
    },
    {
      "chart_type": "line",
      "data_format": {
        "labels": ["north", "south"],
        "categories": ["sales"],
        "values": [[60.0], [40.0]],
        "isStacked": False
      },
      "insight": ["Line chart showing the trend of sales across regions."]
    }
  ]
}
```"#
}

//! Insight generation
//!
//! Best-effort follow-up questions over a tabular answer: one agent call
//! proposes questions about insights, recommendations, and optimization;
//! each question is then answered against the answer table itself.
//! Disabled by default and never fatal — individual question failures are
//! skipped.

use crate::sanitize;
use askboard_agent::instructions::insight_questions_instruction;
use askboard_agent::{AnalyticAgentSession, RawAgentResult};
use askboard_dataset::{Dataset, TableData};
use indexmap::IndexMap;

/// Ordered question-to-answer pairs
pub type InsightAnswers = IndexMap<String, String>;

/// Best-effort insight derivation over tabular answers
#[derive(Debug, Clone)]
pub struct InsightGenerator {
    session: AnalyticAgentSession,
}

impl InsightGenerator {
    /// Create a generator over an agent session
    #[inline]
    #[must_use]
    pub fn new(session: AnalyticAgentSession) -> Self {
        Self { session }
    }

    /// Generate and answer follow-up questions for a table
    ///
    /// Returns `None` when question generation fails or no question could
    /// be answered.
    pub async fn generate(&self, table: &TableData) -> Option<InsightAnswers> {
        let questions = self.questions(table).await?;
        let dataset = match Dataset::from_table("answer", table) {
            Ok(dataset) => dataset,
            Err(err) => {
                tracing::warn!("insight dataset conversion failed: {err}");
                return None;
            }
        };

        let answers = futures::future::join_all(
            questions
                .iter()
                .map(|question| self.answer(question, &dataset)),
        )
        .await;

        let mut out = InsightAnswers::new();
        for (question, answer) in questions.into_iter().zip(answers) {
            match answer {
                Some(answer) => {
                    out.insert(question, answer);
                }
                None => tracing::warn!(question = %question, "insight question skipped"),
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    async fn questions(&self, table: &TableData) -> Option<Vec<String>> {
        let instruction = insight_questions_instruction(&table.to_markdown());
        let raw = match self.session.run_direct(&instruction, &[]).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("insight question generation failed: {err}");
                return None;
            }
        };
        let text = raw.as_text()?;
        match sanitize::parse_lenient::<Vec<String>>(text) {
            Ok(questions) if !questions.is_empty() => Some(questions),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("insight question parse failed: {err}");
                None
            }
        }
    }

    async fn answer(&self, question: &str, dataset: &Dataset) -> Option<String> {
        self.session
            .run(question, std::slice::from_ref(dataset))
            .await
            .ok()
            .map(summarize)
    }
}

fn summarize(result: RawAgentResult) -> String {
    match result {
        RawAgentResult::Scalar(value) => value.to_string(),
        RawAgentResult::Text(text) => text,
        RawAgentResult::Table(table) => table.to_markdown(),
    }
}

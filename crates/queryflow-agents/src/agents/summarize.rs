//! Summarizer agent — natural-language summary of a result set

use crate::agents::rows_field;
use crate::registry::Agent;
use queryflow_core::{Error, Result};
use queryflow_llm::{ChatMessage, ChatRequest, LlmProvider};
use serde_json::{Map, Value};
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You summarize tabular query results for a \
non-technical reader. Answer in two or three sentences, mentioning the row \
count and the most notable values.";

/// Rows included verbatim in the prompt; the rest is counted only.
const SAMPLE_ROWS: usize = 20;

pub struct SummarizerAgent {
    provider: Arc<dyn LlmProvider>,
}

impl SummarizerAgent {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Agent for SummarizerAgent {
    fn name(&self) -> &str {
        "summarize"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let rows = rows_field(payload, "data");
        if rows.is_empty() {
            // No LLM round-trip for an empty result set.
            return Ok(Value::String(
                "No results were found for your query.".to_string(),
            ));
        }

        let query = payload
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or("the user's question");

        let sample: Vec<&Value> = rows.iter().take(SAMPLE_ROWS).collect();
        let user = format!(
            "Question: {}\nTotal rows: {}\nSample rows:\n{}",
            query,
            rows.len(),
            serde_json::to_string_pretty(&sample).unwrap_or_default(),
        );

        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user),
        ]);
        let summary = self
            .provider
            .complete(request)
            .await
            .map_err(|e| Error::agent_failed(self.name(), e.to_string()))?;

        Ok(Value::String(summary.trim().to_string()))
    }
}

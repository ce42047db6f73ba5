//! SQL repair agent — regenerates a statement after an execution error

use crate::agents::generate_sql::strip_code_fences;
use crate::agents::required_str;
use crate::registry::Agent;
use queryflow_core::{Error, Result, SqlQuery};
use queryflow_llm::{ChatMessage, ChatRequest, LlmProvider};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are a SQL repair assistant. A previously \
generated SQL statement failed to execute. Produce a corrected SQL SELECT \
statement for the original question. Respond with the SQL statement only.";

pub struct SqlRepairAgent {
    provider: Arc<dyn LlmProvider>,
}

impl SqlRepairAgent {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Agent for SqlRepairAgent {
    fn name(&self) -> &str {
        "repair_sql"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let query = required_str(payload, "query", self.name())?;
        let previous_sql = payload
            .get("previous_sql")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default();

        warn!(error, "regenerating SQL after execution failure");

        let user = format!(
            "Question: {}\n\nPrevious SQL:\n{}\n\nExecution error:\n{}",
            query, previous_sql, error
        );
        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user),
        ]);
        let raw = self
            .provider
            .complete(request)
            .await
            .map_err(|e| Error::agent_failed(self.name(), e.to_string()))?;

        let sql = strip_code_fences(&raw);
        if sql.is_empty() {
            return Err(Error::agent_failed(self.name(), "model returned empty SQL"));
        }

        Ok(serde_json::to_value(SqlQuery {
            sql,
            confidence: 0.75,
        })?)
    }
}

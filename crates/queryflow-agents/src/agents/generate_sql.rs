//! SQL generation agent — natural language to SQL via the LLM provider

use crate::agents::required_str;
use crate::registry::Agent;
use queryflow_core::{Error, Result, SqlQuery};
use queryflow_llm::{ChatMessage, ChatRequest, LlmProvider};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a SQL generation assistant. Given a user \
question and a database schema, produce one SQL SELECT statement that answers \
the question. Respond with the SQL statement only, no prose.";

pub struct SqlGeneratorAgent {
    provider: Arc<dyn LlmProvider>,
}

impl SqlGeneratorAgent {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Agent for SqlGeneratorAgent {
    fn name(&self) -> &str {
        "generate_sql"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let query = required_str(payload, "query", self.name())?;
        let schema = payload.get("schema");

        let mut user = format!("Question: {}", query);
        if let Some(schema) = schema {
            let rendered = match schema {
                Value::String(s) => s.clone(),
                other => serde_json::to_string(other).unwrap_or_default(),
            };
            user.push_str(&format!("\n\nSchema:\n{}", rendered));
        }

        debug!(query, "generating SQL");
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
            confidence: 0.8,
        })?)
    }
}

/// Models love to wrap SQL in markdown fences; strip them.
pub(crate) fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // drop an optional language tag on the opening fence
    let rest = rest.strip_prefix("sql").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}

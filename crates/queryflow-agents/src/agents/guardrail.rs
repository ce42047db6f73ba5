//! Guardrail agent — screens generated SQL before execution

use crate::agents::required_str;
use crate::registry::Agent;
use queryflow_core::{Error, Result};
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::warn;

/// Statement kinds a text-to-SQL pipeline must never run.
const FORBIDDEN: &[&str] = &["DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "TRUNCATE"];

pub struct GuardrailAgent {
    patterns: Vec<(&'static str, Regex)>,
}

impl Default for GuardrailAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardrailAgent {
    pub fn new() -> Self {
        let patterns = FORBIDDEN
            .iter()
            .map(|kw| {
                let re = Regex::new(&format!(r"(?i)\b{}\b", kw)).expect("static pattern");
                (*kw, re)
            })
            .collect();
        Self { patterns }
    }

    /// First forbidden keyword found in the statement, if any.
    pub fn first_violation(&self, sql: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(sql))
            .map(|(kw, _)| *kw)
    }
}

#[async_trait::async_trait]
impl Agent for GuardrailAgent {
    fn name(&self) -> &str {
        "guardrail_check"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let sql = required_str(payload, "sql", self.name())?;

        match self.first_violation(sql) {
            Some(keyword) => {
                warn!(keyword, "unsafe SQL blocked");
                // Failing the step aborts the plan before execute_sql runs.
                Err(Error::agent_failed(
                    self.name(),
                    format!("unsafe SQL: statement contains {}", keyword),
                ))
            }
            None => Ok(json!({ "allowed": true })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_passes() {
        let g = GuardrailAgent::new();
        assert!(g.first_violation("SELECT * FROM customers").is_none());
    }

    #[test]
    fn mutations_blocked_case_insensitive() {
        let g = GuardrailAgent::new();
        assert_eq!(g.first_violation("drop table customers"), Some("DROP"));
        assert_eq!(g.first_violation("DELETE FROM t"), Some("DELETE"));
        assert_eq!(g.first_violation("Update t set x = 1"), Some("UPDATE"));
    }

    #[test]
    fn keyword_inside_identifier_allowed() {
        let g = GuardrailAgent::new();
        // word boundary: "dropped_at" is not DROP
        assert!(g.first_violation("SELECT dropped_at FROM events").is_none());
    }
}

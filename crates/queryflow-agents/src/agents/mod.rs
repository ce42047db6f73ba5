//! Builtin agents, one file per capability.

pub mod execute_sql;
pub mod export_powerbi;
pub mod generate_sql;
pub mod guardrail;
pub mod recommend_chart;
pub mod repair_sql;
pub mod schema_snapshot;
pub mod summarize;

use queryflow_core::{Error, Result};
use serde_json::{Map, Value};

/// Fetch a required string field from a payload, failing the step when it
/// is absent or not a string.
pub(crate) fn required_str<'a>(
    payload: &'a Map<String, Value>,
    key: &str,
    agent: &str,
) -> Result<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::agent_failed(agent, format!("missing '{}' in payload", key)))
}

/// Read a field as a row array. Token substitution turns prior step
/// outputs into strings, so a JSON-encoded string is parsed back; a bare
/// array passes through; anything else is an empty set.
pub(crate) fn rows_field(payload: &Map<String, Value>, key: &str) -> Vec<Value> {
    match payload.get(key) {
        Some(Value::Array(rows)) => rows.clone(),
        Some(Value::String(s)) => serde_json::from_str::<Value>(s)
            .ok()
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

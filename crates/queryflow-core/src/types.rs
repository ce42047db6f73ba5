//! Core types for Queryflow

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The output of one complete plan run.
///
/// `results` maps step id to the raw invocation result; `context` is the
/// same mapping plus the caller-supplied `inputs` entry, i.e. exactly what
/// later steps resolved their `${...}` tokens against.
#[derive(Clone, Debug, Serialize)]
pub struct RunOutput {
    pub plan: String,
    pub results: Map<String, Value>,
    pub context: Map<String, Value>,
}

impl RunOutput {
    /// Convenience accessor for a step result by id.
    pub fn result(&self, step_id: &str) -> Option<&Value> {
        self.results.get(step_id)
    }
}

/// A generated SQL statement with the model's self-reported confidence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SqlQuery {
    pub sql: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Chart recommendation metadata for retrieved data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisualizationSpec {
    pub chart_type: String,
    pub fields: ChartFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub chart_data: Vec<Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChartFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl VisualizationSpec {
    pub fn table(description: impl Into<String>) -> Self {
        Self {
            chart_type: "table".to_string(),
            fields: ChartFields::default(),
            description: Some(description.into()),
            chart_data: Vec::new(),
        }
    }
}

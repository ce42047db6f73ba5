//! Chart recommendation agent — heuristic visualization pick

use crate::agents::rows_field;
use crate::registry::Agent;
use queryflow_core::{ChartFields, Result, VisualizationSpec};
use serde_json::{Map, Value};
use tracing::debug;

pub struct VizRecommenderAgent;

impl VizRecommenderAgent {
    pub fn new() -> Self {
        Self
    }

    /// Pick a chart from the shape of the first row: two or more numeric
    /// fields suggest a scatter, one numeric against a label suggests a
    /// bar, anything else falls back to a table.
    pub fn recommend(rows: &[Value]) -> VisualizationSpec {
        let Some(first) = rows.first().and_then(Value::as_object) else {
            return VisualizationSpec::table("No data to visualize.");
        };

        let numeric: Vec<&String> = first.iter().filter(|(_, v)| v.is_number()).map(|(k, _)| k).collect();
        let labels: Vec<&String> = first.iter().filter(|(_, v)| v.is_string()).map(|(k, _)| k).collect();

        let chart_type = if numeric.len() >= 2 {
            "scatter"
        } else if numeric.len() == 1 && !labels.is_empty() {
            "bar"
        } else {
            "table"
        };

        VisualizationSpec {
            chart_type: chart_type.to_string(),
            fields: ChartFields {
                x: labels.first().map(|s| s.to_string()).or_else(|| {
                    (chart_type == "scatter").then(|| numeric[0].to_string())
                }),
                y: match chart_type {
                    "scatter" => numeric.get(1).map(|s| s.to_string()),
                    _ => numeric.first().map(|s| s.to_string()),
                },
            },
            description: Some(format!(
                "A {} chart is recommended based on the data fields.",
                chart_type
            )),
            chart_data: rows.to_vec(),
        }
    }
}

impl Default for VizRecommenderAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for VizRecommenderAgent {
    fn name(&self) -> &str {
        "recommend_chart"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let rows = rows_field(payload, "data");
        let spec = Self::recommend(&rows);
        debug!(chart_type = %spec.chart_type, rows = rows.len(), "chart recommended");
        Ok(serde_json::to_value(spec)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_rows_is_table() {
        let spec = VizRecommenderAgent::recommend(&[]);
        assert_eq!(spec.chart_type, "table");
    }

    #[test]
    fn two_numerics_is_scatter() {
        let rows = vec![json!({"height": 1.8, "weight": 80})];
        let spec = VizRecommenderAgent::recommend(&rows);
        assert_eq!(spec.chart_type, "scatter");
    }

    #[test]
    fn label_and_numeric_is_bar() {
        let rows = vec![json!({"region": "emea", "revenue": 1200})];
        let spec = VizRecommenderAgent::recommend(&rows);
        assert_eq!(spec.chart_type, "bar");
        assert_eq!(spec.fields.x.as_deref(), Some("region"));
        assert_eq!(spec.fields.y.as_deref(), Some("revenue"));
    }

    #[test]
    fn all_text_is_table() {
        let rows = vec![json!({"a": "x", "b": "y"})];
        let spec = VizRecommenderAgent::recommend(&rows);
        assert_eq!(spec.chart_type, "table");
    }
}

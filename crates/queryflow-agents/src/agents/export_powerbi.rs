//! Power BI export agent — mock PBIX packaging
//!
//! Produces dataset metadata serialized as a PBIX-stand-in payload. The
//! real REST upload flow is intentionally not implemented; callers get a
//! stub report link.

use crate::agents::rows_field;
use crate::registry::Agent;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use queryflow_core::Result;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

pub struct PowerBiExporterAgent {
    default_dataset: String,
}

impl PowerBiExporterAgent {
    pub fn new(default_dataset: impl Into<String>) -> Self {
        Self {
            default_dataset: default_dataset.into(),
        }
    }
}

#[async_trait::async_trait]
impl Agent for PowerBiExporterAgent {
    fn name(&self) -> &str {
        "export_powerbi"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let rows = rows_field(payload, "data");
        let dataset_name = payload
            .get("dataset_name")
            .and_then(Value::as_str)
            .unwrap_or(&self.default_dataset);

        let columns: Vec<String> = rows
            .first()
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();

        let metadata = json!({
            "dataset_name": dataset_name,
            "rows": rows.len(),
            "columns": columns,
        });
        let pbix = serde_json::to_vec_pretty(&metadata)?;

        info!(dataset_name, rows = rows.len(), "mock PBIX export created");
        Ok(json!({
            "dataset_name": dataset_name,
            "size_bytes": pbix.len(),
            "pbix_base64": STANDARD.encode(&pbix),
            "report_link": format!("https://app.powerbi.com/reports/mock-{}", Uuid::new_v4()),
        }))
    }
}

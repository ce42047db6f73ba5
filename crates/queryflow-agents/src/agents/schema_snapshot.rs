//! Schema snapshot agent — table and column inventory for prompt context

use crate::registry::Agent;
use queryflow_core::{Error, Result};
use serde_json::{json, Map, Value};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::debug;

pub struct SchemaSnapshotAgent {
    pool: SqlitePool,
}

impl SchemaSnapshotAgent {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Agent for SchemaSnapshotAgent {
    fn name(&self) -> &str {
        "schema_snapshot"
    }

    async fn invoke(&self, _payload: &Map<String, Value>) -> Result<Value> {
        let table_rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::agent_failed(self.name(), e.to_string()))?;

        let mut tables = Map::new();
        for table_row in &table_rows {
            let table: String = table_row
                .try_get("name")
                .map_err(|e| Error::agent_failed(self.name(), e.to_string()))?;

            // PRAGMA arguments cannot be bound; the name came from
            // sqlite_master, not user input.
            let column_rows = sqlx::query(&format!("PRAGMA table_info(\"{}\")", table))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::agent_failed(self.name(), e.to_string()))?;

            let columns: Vec<Value> = column_rows
                .iter()
                .map(|row| {
                    let name: String = row.try_get("name").unwrap_or_default();
                    let ty: String = row.try_get("type").unwrap_or_default();
                    json!({ "name": name, "type": ty })
                })
                .collect();
            tables.insert(table, Value::Array(columns));
        }

        debug!(tables = tables.len(), "schema snapshot built");
        Ok(json!({ "tables": tables }))
    }
}

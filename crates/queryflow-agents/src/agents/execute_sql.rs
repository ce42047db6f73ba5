//! SQL executor agent — runs a statement and returns rows as JSON objects

use crate::agents::required_str;
use crate::registry::Agent;
use queryflow_core::{Error, Result};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Column, Row, TypeInfo};
use tracing::{debug, info};

pub struct SqlExecutorAgent {
    pool: SqlitePool,
}

impl SqlExecutorAgent {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Agent for SqlExecutorAgent {
    fn name(&self) -> &str {
        "execute_sql"
    }

    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        let sql = required_str(payload, "sql", self.name())?;
        debug!(sql, "executing SQL");

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::agent_failed(self.name(), e.to_string()))?;

        info!(rows = rows.len(), "query executed");
        let out: Vec<Value> = rows.iter().map(|row| Value::Object(row_to_json(row))).collect();
        Ok(Value::Array(out))
    }
}

/// Best-effort dynamic decoding. SQLite column affinity decides the first
/// attempt; anything undecodable ends up null.
pub(crate) fn row_to_json(row: &SqliteRow) -> Map<String, Value> {
    let mut obj = Map::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "INTEGER" => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "REAL" => row
                .try_get::<Option<f64>, _>(idx)
                .ok()
                .flatten()
                .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number)),
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map(Value::Bool),
            "TEXT" => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(Value::String),
            // expression columns report NULL affinity; try the common types
            _ => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from)
                .or_else(|| {
                    row.try_get::<Option<f64>, _>(idx)
                        .ok()
                        .flatten()
                        .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                })
                .or_else(|| {
                    row.try_get::<Option<String>, _>(idx)
                        .ok()
                        .flatten()
                        .map(Value::String)
                }),
        }
        .unwrap_or(Value::Null);
        obj.insert(column.name().to_string(), value);
    }
    obj
}

//! Application config — serde structs for settings.yaml
//!
//! The file carries a `default` section plus optional per-environment
//! overlay sections (`development`, `production`, ...). The active
//! environment comes from `QUERYFLOW_ENV` and its section is deep-merged
//! over `default` before deserializing.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub llm: LlmSettings,
    pub database: DatabaseSettings,
    pub orchestration: OrchestrationSettings,
    pub powerbi: PowerBiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
    pub log_level: String,
    pub port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "queryflow".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    /// Name of the env var holding the API key. The key itself never
    /// lives in the config file.
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestrationSettings {
    pub plan_file: String,
    pub default_plan: String,
    pub backoff_ms: u64,
}

impl Default for OrchestrationSettings {
    fn default() -> Self {
        Self {
            plan_file: "config/workflow_plans.yaml".to_string(),
            default_plan: "text_to_sql_basic".to_string(),
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PowerBiSettings {
    pub workspace_id: Option<String>,
    pub dataset_name: Option<String>,
}

impl AppConfig {
    /// Load from a settings file, merging the section for `env` over the
    /// `default` section.
    pub fn load(path: &Path, env: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::SourceNotFound(path.display().to_string()))?;
        Self::from_yaml_str(&content, env)
    }

    /// Load using the environment named in `QUERYFLOW_ENV` (default
    /// "development").
    pub fn load_env(path: &Path) -> Result<Self> {
        let env = std::env::var("QUERYFLOW_ENV").unwrap_or_else(|_| "development".to_string());
        Self::load(path, &env)
    }

    pub fn from_yaml_str(content: &str, env: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(content)?;
        let base = doc.get("default").cloned().unwrap_or(Value::Null);
        let overlay = doc.get(env).cloned().unwrap_or(Value::Null);
        let merged = deep_merge(base, overlay);
        if merged.is_null() {
            return Ok(AppConfig::default());
        }
        let config: AppConfig = serde_yaml::from_value(merged)
            .map_err(|e| Error::ConfigError(format!("failed to parse settings: {}", e)))?;
        Ok(config)
    }

    /// Resolve the LLM API key from the configured env var.
    pub fn llm_api_key(&self) -> Option<String> {
        let var = self.llm.api_key_env.as_deref().unwrap_or("QUERYFLOW_LLM_API_KEY");
        std::env::var(var).ok()
    }
}

/// Recursively merge `overlay` over `base`. Mappings merge key-wise;
/// anything else in the overlay wins.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

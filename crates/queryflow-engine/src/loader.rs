//! Plan loader — declarative YAML plan documents
//!
//! A document maps plan names to ordered step sequences:
//!
//! ```yaml
//! plans:
//!   text_to_sql_basic:
//!     steps:
//!       - id: sql_query
//!         agent: generate_sql
//!         input: { query: "${inputs.user_query}" }
//!         retries: 1
//! ```
//!
//! No schema validation happens at load time. Malformed steps surface
//! when the controller reads them, with defaults where sensible: missing
//! `retries` is 0, missing `input` is an empty mapping, missing `steps`
//! is an empty plan.

use queryflow_core::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub struct PlanSet {
    plans: Map<String, Value>,
}

impl PlanSet {
    /// Load a plan document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::SourceNotFound(path.display().to_string()))?;
        let set = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), plans = ?set.names(), "loaded plans");
        Ok(set)
    }

    /// Parse a plan document from a YAML string.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(source)?;
        let plans = doc
            .get("plans")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Self { plans })
    }

    /// Fetch a plan by name.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.plans
            .get(name)
            .ok_or_else(|| Error::PlanNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.plans.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Step sequence of a plan body, in document order.
    pub fn steps(plan: &Value) -> Vec<Step<'_>> {
        plan.get("steps")
            .and_then(Value::as_array)
            .map(|steps| steps.iter().map(|raw| Step { raw }).collect())
            .unwrap_or_default()
    }
}

/// Lazy view over one step of a plan. Field access applies the loader's
/// defaults instead of failing on malformed documents.
#[derive(Clone, Copy)]
pub struct Step<'a> {
    raw: &'a Value,
}

impl Step<'_> {
    pub fn id(&self) -> &str {
        self.raw.get("id").and_then(Value::as_str).unwrap_or("")
    }

    pub fn agent(&self) -> &str {
        self.raw.get("agent").and_then(Value::as_str).unwrap_or("")
    }

    pub fn input(&self) -> Value {
        self.raw
            .get("input")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Additional attempts after the first.
    pub fn retries(&self) -> u32 {
        self.raw
            .get("retries")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
plans:
  demo:
    steps:
      - id: s1
        agent: echo
        input: { v: "${inputs.x}" }
      - id: s2
        agent: echo
        retries: 2
"#;

    #[test]
    fn parses_named_plans() {
        let set = PlanSet::from_yaml_str(DOC).unwrap();
        assert_eq!(set.names(), vec!["demo"]);
        assert!(set.get("demo").is_ok());
    }

    #[test]
    fn missing_plan_is_plan_not_found() {
        let set = PlanSet::from_yaml_str(DOC).unwrap();
        let err = set.get("nope").unwrap_err();
        assert!(matches!(err, Error::PlanNotFound(name) if name == "nope"));
    }

    #[test]
    fn step_defaults_applied_lazily() {
        let set = PlanSet::from_yaml_str(DOC).unwrap();
        let plan = set.get("demo").unwrap();
        let steps = PlanSet::steps(plan);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].retries(), 0);
        assert_eq!(steps[1].retries(), 2);
        // s2 has no input: defaults to an empty mapping
        assert_eq!(steps[1].input(), serde_json::json!({}));
    }

    #[test]
    fn document_without_plans_key_is_empty() {
        let set = PlanSet::from_yaml_str("other: stuff").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = PlanSet::load(Path::new("/nonexistent/plans.yaml")).unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }
}

//! Agent registry and trait definitions
//!
//! Each agent is a self-contained module implementing the Agent trait.
//! Agents are registered under symbolic names that plan documents refer
//! to; the registry is built once at startup and holds no execution state
//! between invocations.

use queryflow_core::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The Agent trait — implement this to add a new capability.
///
/// An agent takes a payload mapping (already resolved by the plan engine)
/// and produces an opaque JSON result. Agents may be invoked repeatedly
/// for the same step when the controller retries a failure, so handlers
/// should be safe to re-run.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Unique symbolic name (e.g. "generate_sql", "execute_sql").
    fn name(&self) -> &str;

    /// Execute the agent against a resolved payload.
    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value>;
}

pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent. Replaces any existing agent with the same name.
    pub fn register(&mut self, agent: impl Agent + 'static) {
        let name = agent.name().to_string();
        self.agents.insert(name, Arc::new(agent));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Invoke an agent by name. An unregistered name is
    /// `Error::UnknownAgent` — the controller treats that as fatal rather
    /// than retryable, since retrying cannot make the name appear.
    pub async fn invoke(&self, name: &str, payload: &Map<String, Value>) -> Result<Value> {
        let agent = self
            .agents
            .get(name)
            .ok_or_else(|| Error::UnknownAgent(name.to_string()))?;
        tracing::debug!(agent = name, keys = ?payload.keys().collect::<Vec<_>>(), "invoking agent");
        agent.invoke(payload).await
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

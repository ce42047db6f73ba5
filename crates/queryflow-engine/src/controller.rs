//! Plan controller — sequential step execution with retry and backoff
//!
//! For each step, in document order: resolve the input template against
//! the growing context, invoke the named agent, and publish the result
//! under the step's id. A step only ever sees context entries from
//! `inputs` and earlier steps, enforced by construction — the context is
//! mutated after a step completes, never before.

use crate::loader::PlanSet;
use crate::resolver::resolve;
use queryflow_agents::AgentRegistry;
use queryflow_core::{Result, RunOutput};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Base unit of the linear backoff: the pause before retry attempt
    /// k+1 is `backoff_base * k`.
    pub backoff_base: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            backoff_base: Duration::from_millis(500),
        }
    }
}

pub struct Controller {
    registry: Arc<AgentRegistry>,
    plans: PlanSet,
    config: ControllerConfig,
}

impl Controller {
    pub fn new(registry: Arc<AgentRegistry>, plans: PlanSet) -> Self {
        Self::with_config(registry, plans, ControllerConfig::default())
    }

    pub fn with_config(
        registry: Arc<AgentRegistry>,
        plans: PlanSet,
        config: ControllerConfig,
    ) -> Self {
        Self {
            registry,
            plans,
            config,
        }
    }

    pub fn plans(&self) -> &PlanSet {
        &self.plans
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Run a named plan to completion. A failed step aborts the run after
    /// its retry budget is exhausted; no partial results are returned.
    pub async fn run(&self, plan_name: &str, inputs: Map<String, Value>) -> Result<RunOutput> {
        let plan = self.plans.get(plan_name)?;

        let mut context = Map::new();
        context.insert("inputs".to_string(), Value::Object(inputs));
        let mut results = Map::new();

        for step in PlanSet::steps(plan) {
            let step_id = step.id();
            let agent = step.agent();
            let retries = step.retries();

            let resolved = resolve(&step.input(), &context);
            // agents take a payload mapping; a scalar input is wrapped
            let payload = match resolved {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };

            info!(step = step_id, agent, retries, "running step");
            let mut attempt = 0u32;
            let step_result = loop {
                attempt += 1;
                match self.registry.invoke(agent, &payload).await {
                    Ok(result) => {
                        info!(step = step_id, attempt, "step succeeded");
                        break result;
                    }
                    Err(err) if err.is_retryable() && attempt <= retries => {
                        warn!(step = step_id, attempt, %err, "step attempt failed, retrying");
                        tokio::time::sleep(self.config.backoff_base * attempt).await;
                    }
                    Err(err) => {
                        error!(step = step_id, attempt, %err, "step failed, aborting plan");
                        return Err(err);
                    }
                }
            };

            results.insert(step_id.to_string(), step_result.clone());
            context.insert(step_id.to_string(), step_result);
        }

        Ok(RunOutput {
            plan: plan_name.to_string(),
            results,
            context,
        })
    }
}

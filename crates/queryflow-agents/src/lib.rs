//! Queryflow Agents — modular agent implementations
//!
//! Each agent is a self-contained file in src/agents/.
//! To add an agent: create the file, implement the Agent trait, register
//! it in create_default_registry() below.

pub mod agents;
pub mod registry;

pub use registry::{Agent, AgentRegistry};

use queryflow_llm::LlmProvider;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

/// Create the default agent registry with all builtin agents.
///
/// This is the closed set of capabilities plan documents may name. Edit
/// this function to add or remove agents.
pub fn create_default_registry(
    provider: Arc<dyn LlmProvider>,
    pool: SqlitePool,
    powerbi_dataset: impl Into<String>,
) -> AgentRegistry {
    let mut registry = AgentRegistry::new();

    // --- LLM prompt wrappers ---
    registry.register(agents::generate_sql::SqlGeneratorAgent::new(provider.clone()));
    registry.register(agents::repair_sql::SqlRepairAgent::new(provider.clone()));
    registry.register(agents::summarize::SummarizerAgent::new(provider));

    // --- Database ---
    registry.register(agents::execute_sql::SqlExecutorAgent::new(pool.clone()));
    registry.register(agents::schema_snapshot::SchemaSnapshotAgent::new(pool));

    // --- Safety and presentation ---
    registry.register(agents::guardrail::GuardrailAgent::new());
    registry.register(agents::recommend_chart::VizRecommenderAgent::new());
    registry.register(agents::export_powerbi::PowerBiExporterAgent::new(
        powerbi_dataset,
    ));

    registry
}

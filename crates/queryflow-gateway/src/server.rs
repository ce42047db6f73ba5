//! Gateway server — health probe and plan-backed query endpoint
//!
//! All runtime objects live in one AppState constructed at startup and
//! injected into handlers via axum State. No process-wide globals.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use queryflow_agents::create_default_registry;
use queryflow_core::AppConfig;
use queryflow_engine::{Controller, ControllerConfig, PlanSet};
use queryflow_llm::AzureOpenAiProvider;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub struct AppState {
    pub controller: Controller,
    pub config: AppConfig,
}

/// Wire up every collaborator from config: LLM provider, SQLite pool,
/// agent registry, plan set, controller.
pub async fn build_state(config: AppConfig) -> anyhow::Result<Arc<AppState>> {
    let endpoint = config
        .llm
        .endpoint
        .clone()
        .ok_or_else(|| anyhow::anyhow!("llm.endpoint not configured"))?;
    let deployment = config
        .llm
        .deployment
        .clone()
        .ok_or_else(|| anyhow::anyhow!("llm.deployment not configured"))?;
    let api_key = config
        .llm_api_key()
        .ok_or_else(|| anyhow::anyhow!("LLM API key env var not set"))?;
    let provider = Arc::new(AzureOpenAiProvider::new(endpoint, deployment, api_key));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;

    let dataset = config
        .powerbi
        .dataset_name
        .clone()
        .unwrap_or_else(|| "queryflow-results".to_string());
    let registry = create_default_registry(provider, pool, dataset);
    info!("Registered agents: {:?}", registry.list());

    let plans = PlanSet::load(Path::new(&config.orchestration.plan_file))?;
    let controller = Controller::with_config(
        Arc::new(registry),
        plans,
        ControllerConfig {
            backoff_base: Duration::from_millis(config.orchestration.backoff_ms),
        },
    );

    Ok(Arc::new(AppState { controller, config }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/query", post(query_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

pub async fn start_server(config: AppConfig, port: u16) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    let app = router(state.clone());

    let bind_addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!("Queryflow Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Environment:  {}", state.config.app.environment);
    info!("  Plans:        {:?}", state.controller.plans().names());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.app.environment,
        "plans": state.controller.plans().names(),
    }))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    user_query: Option<String>,
}

/// Run the configured default plan for one user question and surface the
/// well-known step results back to the caller.
async fn query_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryRequest>,
) -> impl IntoResponse {
    let Some(user_query) = body.user_query.filter(|q| !q.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "error": "Missing 'user_query' field" })),
        );
    };

    info!(user_query, "received user query");
    let mut inputs = Map::new();
    inputs.insert("user_query".to_string(), Value::String(user_query));
    inputs.insert("user_id".to_string(), Value::String("api-user".to_string()));

    let plan_name = state.config.orchestration.default_plan.clone();
    match state.controller.run(&plan_name, inputs).await {
        Ok(output) => {
            let get = |id: &str| output.result(id).cloned().unwrap_or(Value::Null);
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "summary": get("summary"),
                    "visualization": get("viz"),
                    "sql_query": get("sql_query"),
                    "rows": output.result("rows").cloned().unwrap_or_else(|| json!([])),
                })),
            )
        }
        Err(err) => {
            error!(%err, "plan run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": err.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_parses_body() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"user_query": "top 5 customers"}"#).unwrap();
        assert_eq!(req.user_query.as_deref(), Some("top 5 customers"));
    }

    #[test]
    fn query_request_tolerates_missing_field() {
        let req: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_query.is_none());
    }
}

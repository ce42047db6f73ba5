//! Tests for queryflow-engine: plan execution, retry/backoff, and reference flow

use queryflow_agents::{Agent, AgentRegistry};
use queryflow_core::{Error, Result};
use queryflow_engine::{Controller, ControllerConfig, PlanSet};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ===========================================================================
// Mock agents
// ===========================================================================

/// Returns its payload unchanged.
struct EchoAgent;

#[async_trait::async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        "echo"
    }
    async fn invoke(&self, payload: &Map<String, Value>) -> Result<Value> {
        Ok(Value::Object(payload.clone()))
    }
}

/// Returns a fixed value, counting invocations.
struct ConstAgent {
    name: &'static str,
    value: Value,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Agent for ConstAgent {
    fn name(&self) -> &str {
        self.name
    }
    async fn invoke(&self, _payload: &Map<String, Value>) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

/// Fails the first `fail_times` invocations, then succeeds.
struct FlakyAgent {
    fail_times: usize,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Agent for FlakyAgent {
    fn name(&self) -> &str {
        "flaky"
    }
    async fn invoke(&self, _payload: &Map<String, Value>) -> Result<Value> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_times {
            Err(Error::agent_failed("flaky", format!("induced failure {}", attempt)))
        } else {
            Ok(json!({ "attempt": attempt }))
        }
    }
}

fn controller(registry: AgentRegistry, plans: &str) -> Controller {
    Controller::with_config(
        Arc::new(registry),
        PlanSet::from_yaml_str(plans).unwrap(),
        ControllerConfig {
            backoff_base: Duration::from_millis(5),
        },
    )
}

fn inputs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("inputs must be a mapping"),
    }
}

// ===========================================================================
// Basic execution
// ===========================================================================

#[tokio::test]
async fn echo_plan_substitutes_inputs() {
    let mut registry = AgentRegistry::new();
    registry.register(EchoAgent);
    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s1
        agent: echo
        input: { v: "${inputs.x}" }
"#,
    );

    let out = ctl.run("p", inputs(json!({ "x": "hello" }))).await.unwrap();
    assert_eq!(out.plan, "p");
    assert_eq!(out.results["s1"], json!({ "v": "hello" }));
}

#[tokio::test]
async fn steps_run_in_document_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    struct TraceAgent {
        name: &'static str,
        order: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }
    #[async_trait::async_trait]
    impl Agent for TraceAgent {
        fn name(&self) -> &str {
            self.name
        }
        async fn invoke(&self, _payload: &Map<String, Value>) -> Result<Value> {
            self.order.lock().unwrap().push(self.name);
            Ok(json!(true))
        }
    }

    let mut registry = AgentRegistry::new();
    registry.register(TraceAgent { name: "first", order: order.clone() });
    registry.register(TraceAgent { name: "second", order: order.clone() });
    registry.register(TraceAgent { name: "third", order: order.clone() });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - { id: a, agent: first }
      - { id: b, agent: second }
      - { id: c, agent: third }
"#,
    );
    ctl.run("p", Map::new()).await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn step_result_round_trips_into_later_references() {
    let mut registry = AgentRegistry::new();
    registry.register(ConstAgent {
        name: "producer",
        value: json!({ "field": "val", "num": 42 }),
        calls: Arc::new(AtomicUsize::new(0)),
    });
    registry.register(EchoAgent);

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s1
        agent: producer
      - id: s2
        agent: echo
        input: { v: "${s1.field}", n: "${s1.num}" }
"#,
    );
    let out = ctl.run("p", Map::new()).await.unwrap();
    assert_eq!(out.results["s2"], json!({ "v": "val", "n": "42" }));
    // the raw result is stored unstringified in both maps
    assert_eq!(out.context["s1"], json!({ "field": "val", "num": 42 }));
    assert_eq!(out.results["s1"], out.context["s1"]);
}

#[tokio::test]
async fn forward_reference_resolves_to_empty() {
    let mut registry = AgentRegistry::new();
    registry.register(EchoAgent);
    registry.register(ConstAgent {
        name: "producer",
        value: json!({ "x": "late" }),
        calls: Arc::new(AtomicUsize::new(0)),
    });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s1
        agent: echo
        input: { v: "a-${s2.x}-b" }
      - id: s2
        agent: producer
"#,
    );
    let out = ctl.run("p", Map::new()).await.unwrap();
    // s2 had not executed when s1 resolved: empty substitution, not an error
    assert_eq!(out.results["s1"], json!({ "v": "a--b" }));
}

#[tokio::test]
async fn scalar_input_wrapped_as_value_payload() {
    let mut registry = AgentRegistry::new();
    registry.register(EchoAgent);
    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s1
        agent: echo
        input: "${inputs.x}"
"#,
    );
    let out = ctl.run("p", inputs(json!({ "x": "plain" }))).await.unwrap();
    assert_eq!(out.results["s1"], json!({ "value": "plain" }));
}

// ===========================================================================
// Retry and backoff
// ===========================================================================

#[tokio::test]
async fn flaky_step_retried_and_succeeds() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(FlakyAgent { fail_times: 1, calls: calls.clone() });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s2
        agent: flaky
        retries: 1
"#,
    );
    let out = ctl.run("p", Map::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(out.results["s2"], json!({ "attempt": 2 }));
}

#[tokio::test]
async fn retry_budget_is_retries_plus_one_attempts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(FlakyAgent { fail_times: 100, calls: calls.clone() });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s
        agent: flaky
        retries: 2
"#,
    );
    let err = ctl.run("p", Map::new()).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(matches!(err, Error::AgentFailed { .. }));
}

#[tokio::test]
async fn backoff_pause_is_linear_in_attempt_number() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(FlakyAgent { fail_times: 2, calls: calls.clone() });

    let ctl = Controller::with_config(
        Arc::new(registry),
        PlanSet::from_yaml_str(
            r#"
plans:
  p:
    steps:
      - id: s
        agent: flaky
        retries: 2
"#,
        )
        .unwrap(),
        ControllerConfig {
            backoff_base: Duration::from_millis(40),
        },
    );

    let started = std::time::Instant::now();
    ctl.run("p", Map::new()).await.unwrap();
    // pauses: 40ms * 1 after attempt 1, 40ms * 2 after attempt 2
    assert!(started.elapsed() >= Duration::from_millis(120));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn zero_retries_fails_on_first_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(FlakyAgent { fail_times: 1, calls: calls.clone() });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s
        agent: flaky
"#,
    );
    assert!(ctl.run("p", Map::new()).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ===========================================================================
// Failure semantics
// ===========================================================================

#[tokio::test]
async fn unknown_agent_aborts_without_running_later_steps() {
    let later_calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(ConstAgent {
        name: "after",
        value: json!(true),
        calls: later_calls.clone(),
    });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - id: s1
        agent: ghost
        retries: 3
      - id: s2
        agent: after
"#,
    );
    let err = ctl.run("p", Map::new()).await.unwrap_err();
    assert!(matches!(err, Error::UnknownAgent(name) if name == "ghost"));
    // retries do not apply to name-resolution failures, and s2 never ran
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exhausted_step_prevents_later_steps() {
    let later_calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(FlakyAgent {
        fail_times: 100,
        calls: Arc::new(AtomicUsize::new(0)),
    });
    registry.register(ConstAgent {
        name: "after",
        value: json!(true),
        calls: later_calls.clone(),
    });

    let ctl = controller(
        registry,
        r#"
plans:
  p:
    steps:
      - { id: s1, agent: flaky, retries: 1 }
      - { id: s2, agent: after }
"#,
    );
    assert!(ctl.run("p", Map::new()).await.is_err());
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_plan_is_plan_not_found() {
    let ctl = controller(AgentRegistry::new(), "plans: {}");
    let err = ctl.run("absent", Map::new()).await.unwrap_err();
    assert!(matches!(err, Error::PlanNotFound(name) if name == "absent"));
}

#[tokio::test]
async fn empty_plan_succeeds_with_inputs_only_context() {
    let ctl = controller(
        AgentRegistry::new(),
        r#"
plans:
  p:
    steps: []
"#,
    );
    let out = ctl.run("p", inputs(json!({ "k": 1 }))).await.unwrap();
    assert!(out.results.is_empty());
    assert_eq!(out.context["inputs"], json!({ "k": 1 }));
}

// ===========================================================================
// Plan file loading
// ===========================================================================

#[tokio::test]
async fn plan_loaded_from_disk_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plans.yaml");
    std::fs::write(
        &path,
        r#"
plans:
  p:
    steps:
      - id: s1
        agent: echo
        input: { v: "${inputs.x}" }
"#,
    )
    .unwrap();

    let mut registry = AgentRegistry::new();
    registry.register(EchoAgent);
    let ctl = Controller::new(Arc::new(registry), PlanSet::load(&path).unwrap());
    let out = ctl.run("p", inputs(json!({ "x": "disk" }))).await.unwrap();
    assert_eq!(out.results["s1"], json!({ "v": "disk" }));
}

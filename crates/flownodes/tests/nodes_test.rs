// crates/flownodes/tests/nodes_test.rs

use flowcore::{
    EventEmitter, ExecutionEvent, FlowError, Node, NodeError, NodeEvent, Value, WorkflowBuilder,
    WorkflowError,
};
use flowruntime::{
    FlowRuntime, NodeDocument, NodeStatus, RuntimeConfig, WorkflowDocument, WorkflowExt,
};
use std::sync::Arc;
use flownodes::standard_registry;
use serde_json::json;

// Helper function to run a single node outside a workflow
fn run(mut node: Node) -> Result<Node, NodeError> {
    let events = EventEmitter::detached(node.name().to_string());
    node.run(events)?;
    Ok(node)
}

#[test]
fn test_register_all_lists_standard_kinds() {
    let registry = standard_registry().unwrap();
    assert_eq!(
        registry.list_node_types(),
        vec![
            "debug.log",
            "math.add",
            "math.constant",
            "math.divide",
            "math.scale",
            "transform.json_parse",
            "transform.json_stringify",
        ]
    );
}

#[test]
fn test_scale_uses_defaults() {
    let registry = standard_registry().unwrap();
    let node = registry
        .create_node("math.scale", "s")
        .unwrap()
        .with_input("value", 7.0)
        .unwrap();

    let node = run(node).unwrap();
    assert_eq!(
        node.get_output_port("value").unwrap().value(),
        Some(&Value::Number(7.0))
    );
}

#[test]
fn test_divide_by_zero_is_a_step_failure() {
    let registry = standard_registry().unwrap();
    let node = registry
        .create_node("math.divide", "d")
        .unwrap()
        .with_input("dividend", 1.0)
        .unwrap()
        .with_input("divisor", 0.0)
        .unwrap();

    let err = run(node).unwrap_err();
    assert!(matches!(err, NodeError::ExecutionFailed(ref msg) if msg.contains("zero")));
}

#[test]
fn test_json_parse_and_stringify() {
    let registry = standard_registry().unwrap();

    let parse = registry
        .create_node("transform.json_parse", "p")
        .unwrap()
        .with_input("json", r#"{"ok": true}"#)
        .unwrap();
    let parse = run(parse).unwrap();
    assert_eq!(
        parse.get_output_port("parsed").unwrap().value(),
        Some(&Value::Json(json!({"ok": true})))
    );

    let broken = registry
        .create_node("transform.json_parse", "broken")
        .unwrap()
        .with_input("json", "{not json")
        .unwrap();
    assert!(matches!(run(broken), Err(NodeError::ExecutionFailed(_))));

    let stringify = registry
        .create_node("transform.json_stringify", "s")
        .unwrap()
        .with_input("value", vec![1u8, 2])
        .unwrap();
    let stringify = run(stringify).unwrap();
    assert_eq!(
        stringify.get_output_port("json").unwrap().value(),
        Some(&Value::from("[1,2]"))
    );
}

#[test]
fn test_debug_passes_message_through() {
    let registry = standard_registry().unwrap();

    let silent = run(registry.create_node("debug.log", "quiet").unwrap()).unwrap();
    assert!(!silent.get_output_port("message").unwrap().has_value());

    let loud = registry
        .create_node("debug.log", "loud")
        .unwrap()
        .with_input("message", "hello")
        .unwrap();
    let loud = run(loud).unwrap();
    assert_eq!(
        loud.get_output_port("message").unwrap().value(),
        Some(&Value::from("hello"))
    );
}

#[test]
fn test_arithmetic_pipeline() {
    let registry = standard_registry().unwrap();
    let mut builder = WorkflowBuilder::new("arithmetic");
    builder
        .add_node(registry.create_node("math.constant", "two").unwrap().with_param("value", 2.0).unwrap())
        .unwrap()
        .add_node(registry.create_node("math.constant", "three").unwrap().with_param("value", 3.0).unwrap())
        .unwrap()
        .add_node(registry.create_node("math.add", "sum").unwrap())
        .unwrap()
        .add_node(
            registry
                .create_node("math.scale", "scaled")
                .unwrap()
                .with_param("factor", 10.0)
                .unwrap(),
        )
        .unwrap()
        .add_node(registry.create_node("debug.log", "log").unwrap())
        .unwrap();
    builder
        .connect("two", "value", "sum", "a")
        .unwrap()
        .connect("three", "value", "sum", "b")
        .unwrap()
        .connect("sum", "sum", "scaled", "value")
        .unwrap()
        .connect("scaled", "value", "log", "message")
        .unwrap();
    let mut workflow = builder.build().unwrap();

    let report = workflow.execute();

    assert!(report.success, "report: {}", report);
    assert_eq!(workflow.output_value("log", "message"), Some(&Value::Number(50.0)));
}

#[test]
fn test_division_failure_in_document() {
    let registry = standard_registry().unwrap();
    let document = WorkflowDocument::new("divide")
        .with_node(NodeDocument::new("zero", "math.constant").with_param("value", json!(0)))
        .with_node(NodeDocument::new("div", "math.divide").with_input("dividend", json!(9)))
        .with_node(NodeDocument::new("out", "transform.json_stringify"))
        .with_node(NodeDocument::new("other", "math.constant").with_param("value", json!(1)))
        .with_connection("zero", "value", "div", "divisor")
        .with_connection("div", "quotient", "out", "value");
    let mut workflow = document.build(&registry).unwrap();

    let report = workflow.execute();

    assert!(!report.success);
    assert!(matches!(
        report.outcome("div").unwrap().status,
        NodeStatus::Failed(NodeError::ExecutionFailed(_))
    ));
    assert!(matches!(
        report.outcome("out").unwrap().status,
        NodeStatus::Failed(NodeError::UpstreamValueMissing { .. })
    ));
    assert_eq!(report.outcome("other").unwrap().status, NodeStatus::Succeeded);
}

#[test]
fn test_seed_satisfies_required_input_before_build() {
    let registry = standard_registry().unwrap();
    let mut document = WorkflowDocument::new("seeded")
        .with_node(NodeDocument::new("scaled", "math.scale").with_param("factor", json!(2)));

    let err = document.build(&registry).unwrap_err();
    assert!(matches!(
        err,
        FlowError::Workflow(WorkflowError::UnsatisfiedInput { .. })
    ));

    document.seed_input("scaled", "value", json!(3)).unwrap();
    let mut workflow = document.build(&registry).unwrap();
    let report = workflow.execute();

    assert!(report.success, "report: {}", report);
    assert_eq!(workflow.output_value("scaled", "value"), Some(&Value::Number(6.0)));
}

#[test]
fn test_step_events_and_metadata_reach_subscribers() {
    let registry = Arc::new(standard_registry().unwrap());
    let document = WorkflowDocument::new("parse")
        .with_node(NodeDocument::new("parse", "transform.json_parse").with_input("json", json!("[1,2]")))
        .with_node(NodeDocument::new("log", "debug.log"))
        .with_connection("parse", "parsed", "log", "message");

    let runtime = FlowRuntime::with_registry(registry, RuntimeConfig::default());
    let mut workflow = runtime.load(&document).unwrap();
    let mut events = runtime.subscribe_events();
    let report = runtime.execute(&mut workflow);
    assert!(report.success, "report: {}", report);

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert!(received.iter().any(|event| matches!(
        event,
        ExecutionEvent::NodeCompleted { node, metadata, .. }
            if node == "parse" && metadata.get("bytes") == Some(&Value::Number(5.0))
    )));
    assert!(received.iter().any(|event| matches!(
        event,
        ExecutionEvent::NodeEvent { node, event: NodeEvent::Data { port, value }, .. }
            if node == "log" && port == "message" && *value == Value::Json(json!([1, 2]))
    )));
}

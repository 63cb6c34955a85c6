// crates/flowcore/tests/builder_test.rs

mod common;

use common::*;
use flowcore::{BuilderState, WorkflowBuilder, WorkflowError};

#[test]
fn test_add_node_rejects_duplicate_names() {
    let mut builder = WorkflowBuilder::new("dup");
    builder.add_node(source("a", 1.0)).unwrap();

    let err = builder.add_node(source("a", 2.0)).unwrap_err();
    assert_eq!(err, WorkflowError::DuplicateNode("a".to_string()));
    assert_eq!(builder.node_count(), 1);
}

#[test]
fn test_state_moves_from_empty_to_built() {
    let mut builder = WorkflowBuilder::new("states");
    assert_eq!(builder.state(), BuilderState::Empty);

    builder.add_node(source("a", 1.0)).unwrap();
    assert_eq!(builder.state(), BuilderState::Assembling);

    builder.build().unwrap();
    assert_eq!(builder.state(), BuilderState::Built);
}

#[test]
fn test_connect_unknown_node_and_port() {
    let mut builder = WorkflowBuilder::new("unknown");
    builder
        .add_node(source("a", 1.0))
        .unwrap()
        .add_node(increment("b"))
        .unwrap();

    let err = builder.connect("a", "x", "missing", "x").unwrap_err();
    assert_eq!(err, WorkflowError::UnknownNode("missing".to_string()));

    let err = builder.connect("a", "nope", "b", "x").unwrap_err();
    assert_eq!(
        err,
        WorkflowError::UnknownPort {
            node: "a".to_string(),
            port: "nope".to_string()
        }
    );
}

#[test]
fn test_connect_rejects_wrong_direction() {
    let mut builder = WorkflowBuilder::new("direction");
    builder
        .add_node(increment("a"))
        .unwrap()
        .add_node(increment("b"))
        .unwrap();

    // `x` is an input on `a`, so it cannot be a source.
    let err = builder.connect("a", "x", "b", "x").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidConnection { .. }));

    // `y` is an output on `b`, so it cannot be a target.
    let err = builder.connect("a", "y", "b", "y").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidConnection { .. }));
}

#[test]
fn test_connect_checks_port_types() {
    let mut builder = WorkflowBuilder::new("types");
    builder
        .add_node(source("a", 1.0))
        .unwrap()
        .add_node(text_sink("strict"))
        .unwrap()
        .add_node(sink("loose"))
        .unwrap();

    let err = builder.connect("a", "x", "strict", "text").unwrap_err();
    match err {
        WorkflowError::InvalidConnection { connection, reason } => {
            assert_eq!(connection, "a.x -> strict.text");
            assert!(reason.contains("number"), "reason should name the types: {}", reason);
        }
        other => panic!("Expected InvalidConnection, got {:?}", other),
    }

    builder
        .connect("a", "x", "loose", "value")
        .expect("any accepts every port type");
}

#[test]
fn test_fan_in_forbidden_fan_out_allowed() {
    let mut builder = WorkflowBuilder::new("fan");
    builder
        .add_node(source("a", 1.0))
        .unwrap()
        .add_node(source("b", 2.0))
        .unwrap()
        .add_node(increment("c"))
        .unwrap()
        .add_node(increment("d"))
        .unwrap();

    builder.connect("a", "x", "c", "x").unwrap();
    builder.connect("a", "x", "d", "x").expect("fan-out is allowed");

    let err = builder.connect("b", "x", "c", "x").unwrap_err();
    assert_eq!(
        err,
        WorkflowError::PortAlreadyConnected {
            node: "c".to_string(),
            port: "x".to_string()
        }
    );

    let workflow = builder.build().unwrap();
    assert_eq!(workflow.connections().len(), 2);
    let a = workflow.node("a").unwrap();
    assert_eq!(a.get_output_port("x").unwrap().outgoing().len(), 2);
}

#[test]
fn test_build_detects_cycles() {
    let mut builder = WorkflowBuilder::new("cycle");
    builder
        .add_node(source("root", 1.0))
        .unwrap()
        .add_node(increment("b"))
        .unwrap()
        .add_node(increment("c"))
        .unwrap()
        .add_node(sink("tail"))
        .unwrap();
    builder.connect("b", "y", "c", "x").unwrap();
    builder.connect("c", "y", "b", "x").unwrap();
    builder.connect("c", "y", "tail", "value").unwrap();

    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        WorkflowError::CyclicGraph {
            nodes: vec!["b".to_string(), "c".to_string()]
        }
    );
    // Build failed, so the builder is still open.
    assert_eq!(builder.state(), BuilderState::Assembling);
}

#[test]
fn test_self_loop_is_cyclic() {
    let mut builder = WorkflowBuilder::new("loop");
    builder.add_node(increment("a")).unwrap();
    builder.connect("a", "y", "a", "x").unwrap();

    let err = builder.build().unwrap_err();
    assert!(matches!(err, WorkflowError::CyclicGraph { ref nodes } if nodes == &["a"]));
}

#[test]
fn test_build_requires_input_coverage() {
    let mut builder = WorkflowBuilder::new("unsatisfied");
    builder
        .add_node(source("a", 1.0))
        .unwrap()
        .add_node(increment("b"))
        .unwrap();

    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        WorkflowError::UnsatisfiedInput {
            node: "b".to_string(),
            port: "x".to_string()
        }
    );
}

#[test]
fn test_seeded_input_satisfies_build() {
    let mut builder = WorkflowBuilder::new("seeded");
    builder
        .add_node(increment("b").with_input("x", 41.0).unwrap())
        .unwrap();

    let workflow = builder.build().expect("seeded input counts as satisfied");
    assert_eq!(workflow.execution_order(), vec!["b"]);
}

#[test]
fn test_mutation_after_build_fails() {
    let mut builder = WorkflowBuilder::new("frozen");
    builder.add_node(source("a", 1.0)).unwrap();
    builder.build().unwrap();

    let err = builder.add_node(source("b", 1.0)).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidBuilderState { .. }));

    let err = builder.connect("a", "x", "b", "x").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidBuilderState { .. }));

    let err = builder.build().unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidBuilderState { .. }));
}

#[test]
fn test_execution_order_is_topological_with_insertion_tie_break() {
    let mut builder = WorkflowBuilder::new("order");
    // Declared consumer-first so that ordering has to move them.
    builder
        .add_node(increment("late"))
        .unwrap()
        .add_node(sink("free"))
        .unwrap()
        .add_node(source("early", 1.0))
        .unwrap()
        .add_node(source("other", 2.0))
        .unwrap();
    builder.connect("early", "x", "late", "x").unwrap();
    builder.connect("other", "x", "free", "value").unwrap();

    let workflow = builder.build().unwrap();
    let order = workflow.execution_order();
    assert_eq!(order, vec!["early", "late", "other", "free"]);

    for connection in workflow.connections() {
        let from = order.iter().position(|n| *n == connection.from_node).unwrap();
        let to = order.iter().position(|n| *n == connection.to_node).unwrap();
        assert!(from < to, "{} must run before {}", connection.from_node, connection.to_node);
    }
}

#[test]
fn test_summary_lists_nodes_and_connections() {
    let mut builder = WorkflowBuilder::new("summary");
    builder
        .add_node(source("a", 1.0))
        .unwrap()
        .add_node(increment("b"))
        .unwrap();
    builder.connect("a", "x", "b", "x").unwrap();
    let workflow = builder.build().unwrap();

    let text = workflow.summary().to_string();
    assert!(text.contains("Workflow: summary"));
    assert!(text.contains("1. a (test.source)"));
    assert!(text.contains("2. b (test.increment)"));
    assert!(text.contains("a.x -> b.x"));
}

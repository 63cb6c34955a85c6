// Shared fixtures: tiny node kinds built from closures.

#![allow(dead_code)]

use flowcore::{
    Node, NodeContext, NodeDefinitionSchema, NodeError, NodeOutput, ParameterDefinition,
    PortDefinition, PortType,
};
use std::sync::Arc;

/// No inputs, one `x` output copied from the `value` parameter.
pub fn source(name: &str, value: f64) -> Node {
    let schema = NodeDefinitionSchema::builder("test.source")
        .parameter(ParameterDefinition::required("value", PortType::Number))
        .port(PortDefinition::output("x", PortType::Number))
        .build()
        .expect("valid schema");
    let step = |ctx: &NodeContext| -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("x", ctx.require_param("value")?.clone()))
    };
    Node::new(name, Arc::new(schema), Arc::new(step))
        .with_param("value", value)
        .expect("number parameter")
}

/// Required input `x`, output `y = x + 1`.
pub fn increment(name: &str) -> Node {
    let schema = NodeDefinitionSchema::builder("test.increment")
        .port(PortDefinition::input("x", PortType::Number))
        .port(PortDefinition::output("y", PortType::Number))
        .build()
        .expect("valid schema");
    let step = |ctx: &NodeContext| -> Result<NodeOutput, NodeError> {
        let x = ctx.require_input("x")?.as_f64().unwrap_or_default();
        Ok(NodeOutput::new().with_output("y", x + 1.0))
    };
    Node::new(name, Arc::new(schema), Arc::new(step))
}

/// Accepts anything on `value`, emits nothing.
pub fn sink(name: &str) -> Node {
    let schema = NodeDefinitionSchema::builder("test.sink")
        .port(PortDefinition::input("value", PortType::Any))
        .build()
        .expect("valid schema");
    let step = |_: &NodeContext| -> Result<NodeOutput, NodeError> { Ok(NodeOutput::new()) };
    Node::new(name, Arc::new(schema), Arc::new(step))
}

/// Required string input `text`.
pub fn text_sink(name: &str) -> Node {
    let schema = NodeDefinitionSchema::builder("test.text_sink")
        .port(PortDefinition::input("text", PortType::String))
        .build()
        .expect("valid schema");
    let step = |_: &NodeContext| -> Result<NodeOutput, NodeError> { Ok(NodeOutput::new()) };
    Node::new(name, Arc::new(schema), Arc::new(step))
}

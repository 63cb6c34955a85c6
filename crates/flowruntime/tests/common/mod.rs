// Closure-backed node kinds shared by the runtime tests.

#![allow(dead_code)]

use flowcore::{
    NodeContext, NodeDefinitionSchema, NodeError, NodeOutput, ParameterDefinition,
    PortDefinition, PortType, Value,
};
use flowruntime::NodeRegistry;
use std::sync::Arc;

fn number(ctx: &NodeContext, input: &str) -> Result<f64, NodeError> {
    ctx.require_input(input)?
        .as_f64()
        .ok_or_else(|| NodeError::ExecutionFailed(format!("{} is not a number", input)))
}

pub fn test_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Emits its `value` parameter on `x`.
    let schema = NodeDefinitionSchema::builder("test.source")
        .parameter(ParameterDefinition::required("value", PortType::Number))
        .port(PortDefinition::output("x", PortType::Number))
        .build()
        .unwrap();
    registry
        .register(
            schema,
            Arc::new(|ctx: &NodeContext| -> Result<NodeOutput, NodeError> {
                Ok(NodeOutput::new().with_output("x", ctx.require_param("value")?.clone()))
            }),
        )
        .unwrap();

    // y = 2x
    let schema = NodeDefinitionSchema::builder("test.double")
        .port(PortDefinition::input("x", PortType::Number))
        .port(PortDefinition::output("y", PortType::Number))
        .build()
        .unwrap();
    registry
        .register(
            schema,
            Arc::new(|ctx: &NodeContext| -> Result<NodeOutput, NodeError> {
                Ok(NodeOutput::new().with_output("y", number(ctx, "x")? * 2.0))
            }),
        )
        .unwrap();

    // Always fails with a domain error.
    let schema = NodeDefinitionSchema::builder("test.fail")
        .port(PortDefinition::output("x", PortType::Number))
        .build()
        .unwrap();
    registry
        .register(
            schema,
            Arc::new(|_: &NodeContext| -> Result<NodeOutput, NodeError> {
                Err(NodeError::ExecutionFailed("simulator unavailable".to_string()))
            }),
        )
        .unwrap();

    // Writes `x` only when `emit` is true.
    let schema = NodeDefinitionSchema::builder("test.maybe")
        .parameter(ParameterDefinition::optional("emit", PortType::Bool).with_default(false))
        .port(PortDefinition::optional_output("x", PortType::Number))
        .build()
        .unwrap();
    registry
        .register(
            schema,
            Arc::new(|ctx: &NodeContext| -> Result<NodeOutput, NodeError> {
                let emit = ctx.get_param_or("emit", Value::Bool(false)).as_bool() == Some(true);
                let output = NodeOutput::new();
                Ok(if emit { output.with_output("x", 1.0) } else { output })
            }),
        )
        .unwrap();

    // Reports whether its optional input arrived.
    let schema = NodeDefinitionSchema::builder("test.probe")
        .port(PortDefinition::optional_input("value", PortType::Any))
        .port(PortDefinition::output("seen", PortType::Bool))
        .build()
        .unwrap();
    registry
        .register(
            schema,
            Arc::new(|ctx: &NodeContext| -> Result<NodeOutput, NodeError> {
                Ok(NodeOutput::new().with_output("seen", ctx.input("value").is_some()))
            }),
        )
        .unwrap();

    registry
}

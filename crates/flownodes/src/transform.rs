use flowcore::{
    NodeContext, NodeDefinitionSchema, NodeError, NodeOutput, NodeStep, ParameterDefinition,
    PortDefinition, PortType, Value, WorkflowError,
};
use flowruntime::NodeFactory;

/// Parse JSON string to Value
pub struct JsonParseNode;

impl NodeStep for JsonParseNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let input = ctx.require_input("json")?;
        let text = input.as_str().ok_or_else(|| NodeError::TypeMismatch {
            field: "json".to_string(),
            expected: "string".to_string(),
            actual: input.type_name().to_string(),
        })?;

        let parsed: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| NodeError::ExecutionFailed(format!("JSON parse error: {}", e)))?;

        Ok(NodeOutput::new()
            .with_output("parsed", Value::Json(parsed))
            .with_metadata("bytes", text.len() as f64))
    }
}

impl NodeFactory for JsonParseNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("transform.json_parse")
            .description("Parse JSON string")
            .category("transform")
            .port(PortDefinition::input("json", PortType::String))
            .port(PortDefinition::output("parsed", PortType::Json))
            .build()
    }
}

/// Stringify Value to JSON
pub struct JsonStringifyNode;

impl NodeStep for JsonStringifyNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_input("value")?.to_plain_json();
        let pretty = ctx
            .get_param_or("pretty", Value::Bool(false))
            .as_bool()
            .unwrap_or(false);

        let json_str = if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
        .map_err(|e| NodeError::ExecutionFailed(format!("JSON stringify error: {}", e)))?;

        Ok(NodeOutput::new().with_output("json", json_str))
    }
}

impl NodeFactory for JsonStringifyNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("transform.json_stringify")
            .description("Convert value to JSON string")
            .category("transform")
            .parameter(ParameterDefinition::optional("pretty", PortType::Bool).with_default(false))
            .port(PortDefinition::input("value", PortType::Any))
            .port(PortDefinition::output("json", PortType::String))
            .build()
    }
}

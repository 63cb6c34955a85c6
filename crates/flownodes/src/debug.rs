use flowcore::{
    NodeContext, NodeDefinitionSchema, NodeError, NodeOutput, NodeStep, PortDefinition, PortType,
    WorkflowError,
};
use flowruntime::NodeFactory;

/// Simple debug node that logs its input and passes it through
pub struct DebugNode;

impl NodeStep for DebugNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let Some(message) = ctx.input("message") else {
            ctx.events.warn("DEBUG: (no message)");
            return Ok(NodeOutput::new());
        };

        let text = match message.as_str() {
            Some(s) => s.to_string(),
            None => message.to_plain_json().to_string(),
        };
        tracing::info!(node = %ctx.node_name, "DEBUG: {}", text);
        ctx.events.info(format!("DEBUG: {}", text));
        ctx.events.data("message", message.clone());

        Ok(NodeOutput::new().with_output("message", message.clone()))
    }
}

impl NodeFactory for DebugNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("debug.log")
            .description("Logs input values for debugging")
            .category("debug")
            .port(PortDefinition::optional_input("message", PortType::Any))
            .port(PortDefinition::optional_output("message", PortType::Any))
            .build()
    }
}

use flowcore::{
    NodeContext, NodeDefinitionSchema, NodeError, NodeOutput, NodeStep, ParameterDefinition,
    PortDefinition, PortType, Value, WorkflowError,
};
use flowruntime::NodeFactory;

fn number(ctx: &NodeContext, input: &str) -> Result<f64, NodeError> {
    let value = ctx.require_input(input)?;
    value.as_f64().ok_or_else(|| NodeError::TypeMismatch {
        field: input.to_string(),
        expected: "number".to_string(),
        actual: value.type_name().to_string(),
    })
}

/// Emit a configured number
pub struct ConstantNode;

impl NodeStep for ConstantNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_param("value")?.clone();
        Ok(NodeOutput::new().with_output("value", value))
    }
}

impl NodeFactory for ConstantNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("math.constant")
            .description("Emit a constant number")
            .category("math")
            .parameter(ParameterDefinition::required("value", PortType::Number))
            .port(PortDefinition::output("value", PortType::Number))
            .build()
    }
}

/// Sum of two numbers
pub struct AddNode;

impl NodeStep for AddNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let sum = number(ctx, "a")? + number(ctx, "b")?;
        Ok(NodeOutput::new().with_output("sum", sum))
    }
}

impl NodeFactory for AddNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("math.add")
            .description("Add two numbers")
            .category("math")
            .port(PortDefinition::input("a", PortType::Number))
            .port(PortDefinition::input("b", PortType::Number))
            .port(PortDefinition::output("sum", PortType::Number))
            .build()
    }
}

/// `value * factor + offset`
pub struct ScaleNode;

impl NodeStep for ScaleNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let value = number(ctx, "value")?;
        let factor = ctx.get_param_or("factor", Value::Number(1.0));
        let offset = ctx.get_param_or("offset", Value::Number(0.0));
        let scaled = value * factor.as_f64().unwrap_or(1.0) + offset.as_f64().unwrap_or(0.0);
        Ok(NodeOutput::new().with_output("value", scaled))
    }
}

impl NodeFactory for ScaleNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("math.scale")
            .description("Multiply by a factor and add an offset")
            .category("math")
            .parameter(ParameterDefinition::optional("factor", PortType::Number).with_default(1.0))
            .parameter(ParameterDefinition::optional("offset", PortType::Number).with_default(0.0))
            .port(PortDefinition::input("value", PortType::Number))
            .port(PortDefinition::output("value", PortType::Number))
            .build()
    }
}

/// Quotient of two numbers; division by zero is a step failure
pub struct DivideNode;

impl NodeStep for DivideNode {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let dividend = number(ctx, "dividend")?;
        let divisor = number(ctx, "divisor")?;
        if divisor == 0.0 {
            return Err(NodeError::ExecutionFailed(format!(
                "cannot divide {} by zero",
                dividend
            )));
        }
        Ok(NodeOutput::new().with_output("quotient", dividend / divisor))
    }
}

impl NodeFactory for DivideNode {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError> {
        NodeDefinitionSchema::builder("math.divide")
            .description("Divide one number by another")
            .category("math")
            .port(PortDefinition::input("dividend", PortType::Number))
            .port(PortDefinition::input("divisor", PortType::Number))
            .port(PortDefinition::output("quotient", PortType::Number))
            .build()
    }
}

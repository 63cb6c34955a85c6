use crate::{
    events::EventEmitter, InputPort, NodeDefinitionSchema, NodeError, OutputPort, Value,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The single capability every node kind implements: given parameters and
/// inputs, produce outputs or fail.
pub trait NodeStep: Send + Sync {
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError>;
}

impl<F> NodeStep for F
where
    F: Fn(&NodeContext) -> Result<NodeOutput, NodeError> + Send + Sync,
{
    fn run(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        self(ctx)
    }
}

/// Execution context passed to each step
#[derive(Clone)]
pub struct NodeContext {
    /// Name of the node instance being run
    pub node_name: String,

    /// Input values, keyed by input port name. Unset optional inputs are absent.
    pub inputs: HashMap<String, Value>,

    /// Resolved parameters: configured values with schema defaults filled in
    pub params: HashMap<String, Value>,

    /// Event emitter for real-time updates
    pub events: EventEmitter,
}

impl NodeContext {
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    /// Get required input or return error
    pub fn require_input(&self, name: &str) -> Result<&Value, NodeError> {
        self.inputs
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    /// Get parameter value or return error
    pub fn require_param(&self, name: &str) -> Result<&Value, NodeError> {
        self.params
            .get(name)
            .ok_or_else(|| NodeError::MissingParameter {
                node: self.node_name.clone(),
                parameter: name.to_string(),
            })
    }

    /// Get parameter with default
    pub fn get_param_or(&self, name: &str, default: Value) -> Value {
        self.params.get(name).cloned().unwrap_or(default)
    }
}

/// Output from a step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeOutput {
    /// Output port values
    pub outputs: HashMap<String, Value>,

    pub metadata: NodeMetadata,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, port: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(port.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.custom.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub custom: HashMap<String, Value>,
}

/// Outcome of the most recent `run` of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

/// A configured instance of a node kind.
///
/// Owns its ports; parameters are validated against the schema as they are
/// configured, and required parameters are checked when the node runs.
#[derive(Clone)]
pub struct Node {
    name: String,
    schema: Arc<NodeDefinitionSchema>,
    step: Arc<dyn NodeStep>,
    params: HashMap<String, Value>,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
    metadata: NodeMetadata,
    state: RunState,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        schema: Arc<NodeDefinitionSchema>,
        step: Arc<dyn NodeStep>,
    ) -> Self {
        let inputs = schema.inputs().iter().cloned().map(InputPort::new).collect();
        let outputs = schema.outputs().iter().cloned().map(OutputPort::new).collect();
        Self {
            name: name.into(),
            schema,
            step,
            params: HashMap::new(),
            inputs,
            outputs,
            metadata: NodeMetadata::default(),
            state: RunState::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        self.schema.kind()
    }

    pub fn schema(&self) -> &Arc<NodeDefinitionSchema> {
        &self.schema
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Metadata reported by the last successful run
    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    /// Validate and store parameter values. Nothing is stored if any entry
    /// is rejected.
    pub fn configure<I, K, V>(&mut self, params: I) -> Result<&mut Self, NodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut staged = Vec::new();
        for (name, value) in params {
            let name = name.into();
            let value = value.into();
            let definition =
                self.schema
                    .parameter(&name)
                    .ok_or_else(|| NodeError::UnknownParameter {
                        kind: self.schema.kind().to_string(),
                        parameter: name.clone(),
                    })?;
            if !definition.param_type.admits(&value) {
                return Err(NodeError::TypeMismatch {
                    field: name,
                    expected: definition.param_type.to_string(),
                    actual: value.type_name().to_string(),
                });
            }
            staged.push((name, value));
        }
        self.params.extend(staged);
        Ok(self)
    }

    /// Builder-style single parameter.
    pub fn with_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, NodeError> {
        self.configure([(name.into(), value.into())])?;
        Ok(self)
    }

    /// Builder-style input seed.
    pub fn with_input(
        mut self,
        port: &str,
        value: impl Into<Value>,
    ) -> Result<Self, NodeError> {
        self.get_input_port_mut(port)?.set_value(value)?;
        Ok(self)
    }

    /// Effective value of a parameter: configured, else the schema default.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.params.get(name).or_else(|| {
            self.schema
                .parameter(name)
                .and_then(|definition| definition.default.as_ref())
        })
    }

    /// Resolve every parameter, failing on the first required one that has
    /// neither a configured value nor a default.
    pub fn resolved_params(&self) -> Result<HashMap<String, Value>, NodeError> {
        let mut resolved = HashMap::new();
        for definition in self.schema.parameters() {
            match self.parameter(&definition.name) {
                Some(value) => {
                    resolved.insert(definition.name.clone(), value.clone());
                }
                None if definition.required => {
                    return Err(NodeError::MissingParameter {
                        node: self.name.clone(),
                        parameter: definition.name.clone(),
                    });
                }
                None => {}
            }
        }
        Ok(resolved)
    }

    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    pub fn get_input_port(&self, name: &str) -> Result<&InputPort, NodeError> {
        self.inputs
            .iter()
            .find(|port| port.name() == name)
            .ok_or_else(|| self.unknown_port(name))
    }

    pub fn get_input_port_mut(&mut self, name: &str) -> Result<&mut InputPort, NodeError> {
        let index = self.inputs.iter().position(|port| port.name() == name);
        match index {
            Some(index) => Ok(&mut self.inputs[index]),
            None => Err(self.unknown_port(name)),
        }
    }

    pub fn get_output_port(&self, name: &str) -> Result<&OutputPort, NodeError> {
        self.outputs
            .iter()
            .find(|port| port.name() == name)
            .ok_or_else(|| self.unknown_port(name))
    }

    pub(crate) fn get_output_port_mut(&mut self, name: &str) -> Result<&mut OutputPort, NodeError> {
        let index = self.outputs.iter().position(|port| port.name() == name);
        match index {
            Some(index) => Ok(&mut self.outputs[index]),
            None => Err(self.unknown_port(name)),
        }
    }

    /// Clear outputs and connection-driven inputs. Seeded inputs are kept.
    pub fn reset(&mut self) {
        for port in &mut self.inputs {
            if port.is_connected() {
                port.clear();
            }
        }
        for port in &mut self.outputs {
            port.clear();
        }
        self.metadata = NodeMetadata::default();
        self.state = RunState::Pending;
    }

    /// Run the node's step against its current parameters and inputs.
    ///
    /// Outputs are written only if the whole result validates: every name
    /// is a declared output, every value fits its port type, and every
    /// required output is present. On failure all outputs stay unset.
    pub fn run(&mut self, events: EventEmitter) -> Result<(), NodeError> {
        for port in &mut self.outputs {
            port.clear();
        }
        self.metadata = NodeMetadata::default();
        self.state = RunState::Failed;

        let params = self.resolved_params()?;

        let mut inputs = HashMap::new();
        for port in &self.inputs {
            match port.value() {
                Some(value) => {
                    inputs.insert(port.name().to_string(), value.clone());
                }
                None if port.is_required() => {
                    return Err(NodeError::MissingInput(port.name().to_string()));
                }
                None => {}
            }
        }

        let ctx = NodeContext {
            node_name: self.name.clone(),
            inputs,
            params,
            events,
        };

        tracing::debug!(node = %self.name, kind = %self.kind(), "running step");
        let output = self.step.run(&ctx)?;

        let mut undeclared: Vec<&String> = output
            .outputs
            .keys()
            .filter(|name| self.get_output_port(name).is_err())
            .collect();
        undeclared.sort();
        if let Some(name) = undeclared.first() {
            return Err(self.unknown_port(name));
        }
        for port in &self.outputs {
            match output.outputs.get(port.name()) {
                Some(value) => port.check(value)?,
                None if port.is_required() => {
                    return Err(NodeError::OutputNotProduced(port.name().to_string()));
                }
                None => {}
            }
        }

        for (name, value) in output.outputs {
            self.get_output_port_mut(&name)?.set_value(value)?;
        }
        self.metadata = output.metadata;
        self.state = RunState::Succeeded;
        Ok(())
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    fn unknown_port(&self, port: &str) -> NodeError {
        NodeError::UnknownPort {
            node: self.name.clone(),
            port: port.to_string(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.schema.kind())
            .field("params", &self.params)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("state", &self.state)
            .finish()
    }
}

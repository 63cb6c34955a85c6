//! Port definitions and the per-node port instances that hold values.

use crate::{Connection, NodeError, PortType, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// Static description of a port, shared by every node of a kind.
///
/// For inputs, `required` means the port needs a connection or a seeded
/// value before execution. For outputs it means the step must write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDefinition {
    pub name: String,
    pub port_type: PortType,
    pub direction: PortDirection,
    pub required: bool,
    pub description: String,
}

impl PortDefinition {
    /// Required input port.
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(name, port_type, PortDirection::Input, true)
    }

    pub fn optional_input(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(name, port_type, PortDirection::Input, false)
    }

    /// Required output port.
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(name, port_type, PortDirection::Output, true)
    }

    pub fn optional_output(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(name, port_type, PortDirection::Output, false)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn new(
        name: impl Into<String>,
        port_type: PortType,
        direction: PortDirection,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            port_type,
            direction,
            required,
            description: String::new(),
        }
    }

    fn check(&self, value: &Value) -> Result<(), NodeError> {
        if self.port_type.admits(value) {
            Ok(())
        } else {
            Err(NodeError::TypeMismatch {
                field: self.name.clone(),
                expected: self.port_type.to_string(),
                actual: value.type_name().to_string(),
            })
        }
    }
}

/// Input slot on a node. Fed either by a seeded value or by at most one
/// incoming connection.
#[derive(Debug, Clone)]
pub struct InputPort {
    definition: PortDefinition,
    value: Option<Value>,
    incoming: Option<Connection>,
}

impl InputPort {
    pub(crate) fn new(definition: PortDefinition) -> Self {
        Self {
            definition,
            value: None,
            incoming: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &PortDefinition {
        &self.definition
    }

    pub fn port_type(&self) -> PortType {
        self.definition.port_type
    }

    pub fn is_required(&self) -> bool {
        self.definition.required
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn get_value(&self) -> Result<&Value, NodeError> {
        self.value
            .as_ref()
            .ok_or_else(|| NodeError::PortNotSet(self.definition.name.clone()))
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<(), NodeError> {
        let value = value.into();
        self.definition.check(&value)?;
        self.value = Some(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn incoming(&self) -> Option<&Connection> {
        self.incoming.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.incoming.is_some()
    }

    pub(crate) fn attach(&mut self, connection: Connection) {
        self.incoming = Some(connection);
    }
}

/// Output slot on a node, written by the node's step. May fan out to any
/// number of inputs.
#[derive(Debug, Clone)]
pub struct OutputPort {
    definition: PortDefinition,
    value: Option<Value>,
    outgoing: Vec<Connection>,
}

impl OutputPort {
    pub(crate) fn new(definition: PortDefinition) -> Self {
        Self {
            definition,
            value: None,
            outgoing: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &PortDefinition {
        &self.definition
    }

    pub fn port_type(&self) -> PortType {
        self.definition.port_type
    }

    pub fn is_required(&self) -> bool {
        self.definition.required
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn get_value(&self) -> Result<&Value, NodeError> {
        self.value
            .as_ref()
            .ok_or_else(|| NodeError::PortNotSet(self.definition.name.clone()))
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<(), NodeError> {
        let value = value.into();
        self.definition.check(&value)?;
        self.value = Some(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn outgoing(&self) -> &[Connection] {
        &self.outgoing
    }

    pub(crate) fn attach(&mut self, connection: Connection) {
        self.outgoing.push(connection);
    }

    pub(crate) fn check(&self, value: &Value) -> Result<(), NodeError> {
        self.definition.check(value)
    }
}

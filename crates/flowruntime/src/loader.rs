//! Declarative workflow documents.
//!
//! A document names node kinds and wires them by name. Loading resolves
//! every kind through a [`NodeRegistry`] and drives a [`WorkflowBuilder`],
//! so a document is subject to exactly the checks a hand-built graph is.

use crate::registry::NodeRegistry;
use flowcore::{FlowError, PortType, Value, Workflow, WorkflowBuilder, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub connections: Vec<ConnectionDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub name: String,
    pub kind: String,
    /// Parameter values as plain JSON
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
    /// Seed values for unconnected inputs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, serde_json::Value>,
}

/// Connection by node and port name. Generated documents may carry `null`
/// node references; those are rejected when the document is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    pub from_node: Option<String>,
    pub from_port: String,
    pub to_node: Option<String>,
    pub to_port: String,
}

impl WorkflowDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_node(mut self, node: NodeDocument) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_connection(
        mut self,
        from_node: &str,
        from_port: &str,
        to_node: &str,
        to_port: &str,
    ) -> Self {
        self.connections.push(ConnectionDocument {
            from_node: Some(from_node.to_string()),
            from_port: from_port.to_string(),
            to_node: Some(to_node.to_string()),
            to_port: to_port.to_string(),
        });
        self
    }

    /// Record a seed for `node.port`, replacing any seed the document
    /// already carries. Seeds are applied before the graph is built, so they
    /// count towards satisfying required inputs.
    pub fn seed_input(
        &mut self,
        node: &str,
        port: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<&mut Self, WorkflowError> {
        let entry = self
            .nodes
            .iter_mut()
            .find(|entry| entry.name == node)
            .ok_or_else(|| WorkflowError::UnknownNode(node.to_string()))?;
        entry.inputs.insert(port.into(), value);
        Ok(self)
    }

    /// Instantiate, configure and wire every node, then build the graph.
    ///
    /// A missing or `null` node reference fails with
    /// [`WorkflowError::UnknownNode`]; nothing is silently skipped.
    pub fn build(&self, registry: &NodeRegistry) -> Result<Workflow, FlowError> {
        let mut builder = WorkflowBuilder::new(&self.name);

        for entry in &self.nodes {
            let mut node = registry.create_node(&entry.kind, &entry.name)?;

            let params: Vec<(String, Value)> = entry
                .params
                .iter()
                .map(|(name, json)| {
                    let declared = node
                        .schema()
                        .parameter(name)
                        .map(|p| p.param_type)
                        .unwrap_or(PortType::Any);
                    (name.clone(), coerce(json, declared))
                })
                .collect();
            node.configure(params)?;

            for (port, json) in &entry.inputs {
                let input = node.get_input_port_mut(port)?;
                let value = coerce(json, input.port_type());
                input.set_value(value)?;
            }

            builder.add_node(node)?;
        }

        for connection in &self.connections {
            let from = resolve(&connection.from_node, "source")?;
            let to = resolve(&connection.to_node, "target")?;
            builder.connect(from, &connection.from_port, to, &connection.to_port)?;
        }

        Ok(builder.build()?)
    }
}

impl NodeDocument {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            params: BTreeMap::new(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_input(mut self, port: impl Into<String>, value: serde_json::Value) -> Self {
        self.inputs.insert(port.into(), value);
        self
    }
}

fn resolve<'a>(reference: &'a Option<String>, end: &str) -> Result<&'a str, WorkflowError> {
    reference
        .as_deref()
        .ok_or_else(|| WorkflowError::UnknownNode(format!("<null {} reference>", end)))
}

/// Json-typed slots keep the raw document; everything else maps onto the
/// native value variants.
fn coerce(json: &serde_json::Value, declared: PortType) -> Value {
    match declared {
        PortType::Json => Value::Json(json.clone()),
        _ => Value::from_plain_json(json.clone()),
    }
}

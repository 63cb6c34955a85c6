//! Node kind templates.
//!
//! A [`NodeDefinitionSchema`] is built once per node kind and shared
//! read-only (behind `Arc`) by every node instance of that kind.

use crate::{PortDefinition, PortDirection, PortType, Value, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub param_type: PortType,
    pub default: Option<Value>,
    pub required: bool,
    pub description: String,
}

impl ParameterDefinition {
    pub fn required(name: impl Into<String>, param_type: PortType) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: None,
            required: true,
            description: String::new(),
        }
    }

    pub fn optional(name: impl Into<String>, param_type: PortType) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Entry point a kind exposes as its execution step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    pub description: String,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

impl Default for MethodDefinition {
    fn default() -> Self {
        Self::new("run")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinitionSchema {
    kind: String,
    description: String,
    category: String,
    parameters: Vec<ParameterDefinition>,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
    method: MethodDefinition,
}

impl NodeDefinitionSchema {
    pub fn builder(kind: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: NodeDefinitionSchema {
                kind: kind.into(),
                description: String::new(),
                category: "general".to_string(),
                parameters: Vec::new(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                method: MethodDefinition::default(),
            },
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn inputs(&self) -> &[PortDefinition] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortDefinition] {
        &self.outputs
    }

    pub fn method(&self) -> &MethodDefinition {
        &self.method
    }
}

/// Assembles a schema and checks name uniqueness on `build`.
pub struct SchemaBuilder {
    schema: NodeDefinitionSchema,
}

impl SchemaBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.schema.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.schema.category = category.into();
        self
    }

    pub fn parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.schema.parameters.push(parameter);
        self
    }

    /// Add a port; the direction in the definition decides which side.
    pub fn port(mut self, port: PortDefinition) -> Self {
        match port.direction {
            PortDirection::Input => self.schema.inputs.push(port),
            PortDirection::Output => self.schema.outputs.push(port),
        }
        self
    }

    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.schema.method = method;
        self
    }

    pub fn build(self) -> Result<NodeDefinitionSchema, WorkflowError> {
        let schema = self.schema;
        let invalid = |reason: String| WorkflowError::InvalidSchema {
            kind: schema.kind.clone(),
            reason,
        };

        if let Some(name) = first_duplicate(schema.parameters.iter().map(|p| p.name.as_str())) {
            return Err(invalid(format!("duplicate parameter '{}'", name)));
        }
        if let Some(name) = first_duplicate(schema.inputs.iter().map(|p| p.name.as_str())) {
            return Err(invalid(format!("duplicate input port '{}'", name)));
        }
        if let Some(name) = first_duplicate(schema.outputs.iter().map(|p| p.name.as_str())) {
            return Err(invalid(format!("duplicate output port '{}'", name)));
        }
        for parameter in &schema.parameters {
            if let Some(default) = &parameter.default {
                if !parameter.param_type.admits(default) {
                    return Err(invalid(format!(
                        "default for '{}' is {}, expected {}",
                        parameter.name,
                        default.type_name(),
                        parameter.param_type
                    )));
                }
            }
        }

        Ok(schema)
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}

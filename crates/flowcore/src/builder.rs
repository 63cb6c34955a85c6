use crate::graph::execution_order;
use crate::{Connection, Node, NodeError, Workflow, WorkflowError};
use std::collections::HashMap;
use std::fmt;
use std::mem;

/// Lifecycle of a [`WorkflowBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Empty,
    Assembling,
    Built,
}

impl fmt::Display for BuilderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuilderState::Empty => "empty",
            BuilderState::Assembling => "assembling",
            BuilderState::Built => "built",
        };
        f.write_str(name)
    }
}

/// Accumulates nodes and connections, validating each call, then produces
/// an immutable [`Workflow`].
///
/// ```ignore
/// let mut builder = WorkflowBuilder::new("pipeline");
/// builder
///     .add_node(source)?
///     .add_node(sink)?
///     .connect("source", "value", "sink", "value")?;
/// let workflow = builder.build()?;
/// ```
///
/// `build` is one-shot: afterwards every mutating call fails with
/// [`WorkflowError::InvalidBuilderState`].
#[derive(Debug)]
pub struct WorkflowBuilder {
    name: String,
    state: BuilderState,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: BuilderState::Empty,
            nodes: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_node(&mut self, node: Node) -> Result<&mut Self, WorkflowError> {
        self.ensure_open("add a node")?;
        if self.index.contains_key(node.name()) {
            return Err(WorkflowError::DuplicateNode(node.name().to_string()));
        }

        tracing::debug!(node = %node.name(), kind = %node.kind(), "adding node");
        self.index.insert(node.name().to_string(), self.nodes.len());
        self.nodes.push(node);
        self.state = BuilderState::Assembling;
        Ok(self)
    }

    /// Wire `src_node.src_port` (an output) to `dst_node.dst_port` (an input).
    ///
    /// Fan-out from one output is allowed; an input accepts one connection.
    pub fn connect(
        &mut self,
        src_node: &str,
        src_port: &str,
        dst_node: &str,
        dst_port: &str,
    ) -> Result<&mut Self, WorkflowError> {
        self.ensure_open("connect ports")?;
        let connection = Connection::new(src_node, src_port, dst_node, dst_port);

        let src = self.position(src_node)?;
        let dst = self.position(dst_node)?;

        let source_type = match self.nodes[src].get_output_port(src_port) {
            Ok(port) => port.port_type(),
            Err(_) if self.nodes[src].get_input_port(src_port).is_ok() => {
                return Err(WorkflowError::InvalidConnection {
                    connection: connection.to_string(),
                    reason: format!("'{}' is an input port of '{}'", src_port, src_node),
                });
            }
            Err(e) => return Err(port_error(e)),
        };

        let target = match self.nodes[dst].get_input_port(dst_port) {
            Ok(port) => port,
            Err(_) if self.nodes[dst].get_output_port(dst_port).is_ok() => {
                return Err(WorkflowError::InvalidConnection {
                    connection: connection.to_string(),
                    reason: format!("'{}' is an output port of '{}'", dst_port, dst_node),
                });
            }
            Err(e) => return Err(port_error(e)),
        };

        if !source_type.is_compatible_with(target.port_type()) {
            return Err(WorkflowError::InvalidConnection {
                connection: connection.to_string(),
                reason: format!(
                    "type {} is not compatible with {}",
                    source_type,
                    target.port_type()
                ),
            });
        }
        if target.is_connected() {
            return Err(WorkflowError::PortAlreadyConnected {
                node: dst_node.to_string(),
                port: dst_port.to_string(),
            });
        }

        tracing::debug!(%connection, "connecting ports");
        self.nodes[dst]
            .get_input_port_mut(dst_port)
            .map_err(port_error)?
            .attach(connection.clone());
        self.nodes[src]
            .get_output_port_mut(src_port)
            .map_err(port_error)?
            .attach(connection.clone());
        self.connections.push(connection);
        Ok(self)
    }

    /// Validate the whole graph and hand over its nodes.
    ///
    /// Fails with [`WorkflowError::CyclicGraph`] when no topological order
    /// exists, or [`WorkflowError::UnsatisfiedInput`] for the first required
    /// input with neither a connection nor a value. On failure the builder
    /// keeps its contents and stays open.
    pub fn build(&mut self) -> Result<Workflow, WorkflowError> {
        self.ensure_open("build")?;

        let edges: Vec<(usize, usize)> = self
            .connections
            .iter()
            .map(|c| (self.index[&c.from_node], self.index[&c.to_node]))
            .collect();

        let order = execution_order(self.nodes.len(), &edges).map_err(|cyclic| {
            WorkflowError::CyclicGraph {
                nodes: cyclic
                    .into_iter()
                    .map(|i| self.nodes[i].name().to_string())
                    .collect(),
            }
        })?;

        for node in &self.nodes {
            if let Some(port) = node
                .inputs()
                .iter()
                .find(|port| port.is_required() && !port.is_connected() && !port.has_value())
            {
                return Err(WorkflowError::UnsatisfiedInput {
                    node: node.name().to_string(),
                    port: port.name().to_string(),
                });
            }
        }

        self.state = BuilderState::Built;
        let workflow = Workflow::new(
            mem::take(&mut self.name),
            mem::take(&mut self.nodes),
            mem::take(&mut self.index),
            mem::take(&mut self.connections),
            order,
        );
        tracing::info!(
            workflow = %workflow.name(),
            nodes = workflow.nodes().len(),
            connections = workflow.connections().len(),
            "workflow built"
        );
        Ok(workflow)
    }

    fn ensure_open(&self, operation: &str) -> Result<(), WorkflowError> {
        if self.state == BuilderState::Built {
            return Err(WorkflowError::InvalidBuilderState {
                state: self.state.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn position(&self, node: &str) -> Result<usize, WorkflowError> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownNode(node.to_string()))
    }
}

fn port_error(error: NodeError) -> WorkflowError {
    match error {
        NodeError::UnknownPort { node, port } => WorkflowError::UnknownPort { node, port },
        other => WorkflowError::InvalidConnection {
            connection: String::new(),
            reason: other.to_string(),
        },
    }
}

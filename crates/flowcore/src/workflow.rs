use crate::events::EventEmitter;
use crate::{Connection, FlowError, Node, NodeError, RunState, Value, WorkflowError};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

pub type WorkflowId = Uuid;

/// An assembled, validated graph with a fixed execution order.
///
/// Produced by [`crate::WorkflowBuilder::build`]. Its wiring never changes;
/// parameters may still be re-configured and unconnected inputs re-seeded.
#[derive(Debug, Clone)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
    order: Vec<usize>,
}

impl Workflow {
    pub(crate) fn new(
        name: String,
        nodes: Vec<Node>,
        index: HashMap<String, usize>,
        connections: Vec<Connection>,
        order: Vec<usize>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            nodes,
            index,
            connections,
            order,
        }
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Node names in the order they execute.
    pub fn execution_order(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.nodes[i].name()).collect()
    }

    /// Current value of an output port, if the node produced one.
    pub fn output_value(&self, node: &str, port: &str) -> Option<&Value> {
        self.node(node)?.get_output_port(port).ok()?.value()
    }

    /// Re-configure parameters on a built node. Connections are unaffected.
    pub fn configure_node<I, K, V>(&mut self, node: &str, params: I) -> Result<(), FlowError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let node = self.node_mut(node)?;
        node.configure(params)?;
        Ok(())
    }

    /// Seed an input that has no incoming connection.
    pub fn set_input(
        &mut self,
        node: &str,
        port: &str,
        value: impl Into<Value>,
    ) -> Result<(), FlowError> {
        let target = self.node_mut(node)?;
        let input = target.get_input_port_mut(port)?;
        if input.is_connected() {
            return Err(WorkflowError::InputDrivenByConnection {
                node: node.to_string(),
                port: port.to_string(),
            }
            .into());
        }
        input.set_value(value)?;
        Ok(())
    }

    /// Clear every produced value so the next run starts clean. Seeded
    /// inputs are kept.
    pub fn reset_values(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Copy upstream output values into `node`'s connected inputs.
    ///
    /// A connection whose source node did not succeed, or whose source left
    /// a value unset that a required input needs, fails with
    /// [`NodeError::UpstreamValueMissing`] and marks `node` as failed.
    pub fn propagate_inputs(&mut self, node: &str) -> Result<(), FlowError> {
        let target = self.position(node)?;
        let incoming: Vec<Connection> = self.nodes[target]
            .inputs()
            .iter()
            .filter_map(|port| port.incoming().cloned())
            .collect();

        for connection in incoming {
            let source = &self.nodes[self.index[&connection.from_node]];
            let value = source
                .get_output_port(&connection.from_port)?
                .value()
                .cloned();
            let source_succeeded = source.state() == RunState::Succeeded;

            let input = self.nodes[target].get_input_port_mut(&connection.to_port)?;
            let result = match value {
                Some(value) => input.set_value(value),
                None if source_succeeded && !input.is_required() => {
                    input.clear();
                    Ok(())
                }
                None => Err(NodeError::UpstreamValueMissing {
                    port: connection.to_port.clone(),
                    source_node: connection.from_node.clone(),
                    source_port: connection.from_port.clone(),
                }),
            };
            if let Err(e) = result {
                self.nodes[target].set_state(RunState::Failed);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Run a single node's step. Inputs must already be propagated.
    pub fn run_node(&mut self, node: &str, events: EventEmitter) -> Result<(), FlowError> {
        let target = self.position(node)?;
        Ok(self.nodes[target].run(events)?)
    }

    pub fn summary(&self) -> WorkflowSummary<'_> {
        WorkflowSummary { workflow: self }
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut Node, WorkflowError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(WorkflowError::UnknownNode(name.to_string())),
        }
    }

    fn position(&self, name: &str) -> Result<usize, WorkflowError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownNode(name.to_string()))
    }
}

/// Human-readable listing of a workflow's nodes and connections.
pub struct WorkflowSummary<'a> {
    workflow: &'a Workflow,
}

impl fmt::Display for WorkflowSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let workflow = self.workflow;
        writeln!(f, "Workflow: {}", workflow.name)?;
        writeln!(f, "  Nodes ({}):", workflow.nodes.len())?;
        for (step, &i) in workflow.order.iter().enumerate() {
            let node = &workflow.nodes[i];
            writeln!(f, "    {}. {} ({})", step + 1, node.name(), node.kind())?;
        }
        writeln!(f, "  Connections ({}):", workflow.connections.len())?;
        for connection in &workflow.connections {
            writeln!(f, "    {}", connection)?;
        }
        Ok(())
    }
}

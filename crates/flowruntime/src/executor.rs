use chrono::Utc;
use flowcore::{
    EventBus, EventEmitter, ExecutionEvent, ExecutionId, FlowError, NodeError, Value, Workflow,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// What the executor does after a node fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorHandling {
    /// Keep running every remaining node so that independent branches still
    /// complete and all failures surface in one run.
    #[default]
    ContinueOnError,
    /// Record the remaining nodes as skipped after the first failure.
    StopWorkflow,
}

/// Runs a built workflow's nodes one at a time in its precomputed order.
#[derive(Debug, Clone, Default)]
pub struct WorkflowExecutor {
    on_error: ErrorHandling,
}

impl WorkflowExecutor {
    pub fn new(on_error: ErrorHandling) -> Self {
        Self { on_error }
    }

    /// Execute a workflow from a clean value state and report every node's
    /// outcome.
    ///
    /// A failing node never aborts the run under
    /// [`ErrorHandling::ContinueOnError`]: its outputs stay unset, and nodes
    /// fed by them fail with [`NodeError::UpstreamValueMissing`].
    pub fn execute(&self, workflow: &mut Workflow, event_bus: &EventBus) -> ExecutionReport {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();

        event_bus.emit(ExecutionEvent::WorkflowStarted {
            execution_id,
            workflow: workflow.name().to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!("Starting workflow execution: {}", workflow.name());

        workflow.reset_values();
        let order: Vec<String> = workflow
            .execution_order()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut outcomes = Vec::with_capacity(order.len());
        let mut halted = false;

        for node in order {
            if halted {
                tracing::debug!("Skipping node {} after earlier failure", node);
                outcomes.push(NodeOutcome {
                    node,
                    status: NodeStatus::Skipped,
                    duration_ms: 0,
                });
                continue;
            }

            let kind = workflow
                .node(&node)
                .map(|n| n.kind().to_string())
                .unwrap_or_default();
            event_bus.emit(ExecutionEvent::NodeStarted {
                execution_id,
                node: node.clone(),
                kind,
                timestamp: Utc::now(),
            });

            let start = Instant::now();
            let emitter = event_bus.create_emitter(execution_id, &node);
            let result = run_one(workflow, &node, emitter);
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    tracing::info!("Node {} completed in {}ms", node, duration_ms);

                    event_bus.emit(ExecutionEvent::NodeCompleted {
                        execution_id,
                        node: node.clone(),
                        outputs: produced_outputs(workflow, &node),
                        metadata: workflow
                            .node(&node)
                            .map(|n| n.metadata().custom.clone())
                            .unwrap_or_default(),
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                    outcomes.push(NodeOutcome {
                        node,
                        status: NodeStatus::Succeeded,
                        duration_ms,
                    });
                }
                Err(e) => {
                    tracing::error!("Node {} failed: {}", node, e);

                    event_bus.emit(ExecutionEvent::NodeFailed {
                        execution_id,
                        node: node.clone(),
                        error: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    outcomes.push(NodeOutcome {
                        node,
                        status: NodeStatus::Failed(e),
                        duration_ms,
                    });
                    halted = self.on_error == ErrorHandling::StopWorkflow;
                }
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let success = outcomes
            .iter()
            .all(|outcome| outcome.status == NodeStatus::Succeeded);

        event_bus.emit(ExecutionEvent::WorkflowCompleted {
            execution_id,
            success,
            duration_ms,
            timestamp: Utc::now(),
        });

        ExecutionReport {
            execution_id,
            workflow: workflow.name().to_string(),
            success,
            outcomes,
            duration_ms,
        }
    }
}

fn run_one(workflow: &mut Workflow, node: &str, emitter: EventEmitter) -> Result<(), NodeError> {
    workflow
        .propagate_inputs(node)
        .and_then(|()| workflow.run_node(node, emitter))
        .map_err(|e| match e {
            FlowError::Node(e) => e,
            other => NodeError::ExecutionFailed(other.to_string()),
        })
}

fn produced_outputs(workflow: &Workflow, node: &str) -> HashMap<String, Value> {
    workflow
        .node(node)
        .map(|n| {
            n.outputs()
                .iter()
                .filter_map(|port| port.value().map(|v| (port.name().to_string(), v.clone())))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeStatus {
    Succeeded,
    Failed(NodeError),
    Skipped,
}

#[derive(Debug, Clone)]
pub struct NodeOutcome {
    pub node: String,
    pub status: NodeStatus,
    pub duration_ms: u64,
}

/// Result of one workflow execution
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub execution_id: ExecutionId,
    pub workflow: String,
    pub success: bool,
    /// One entry per node, in execution order
    pub outcomes: Vec<NodeOutcome>,
    pub duration_ms: u64,
}

impl ExecutionReport {
    pub fn outcome(&self, node: &str) -> Option<&NodeOutcome> {
        self.outcomes.iter().find(|outcome| outcome.node == node)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &NodeError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            NodeStatus::Failed(e) => Some((outcome.node.as_str(), e)),
            _ => None,
        })
    }

    pub fn completed_nodes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == NodeStatus::Succeeded)
            .count()
    }

    pub fn total_nodes(&self) -> usize {
        self.outcomes.len()
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Execution {} of '{}': {} ({}/{} nodes, {}ms)",
            self.execution_id,
            self.workflow,
            if self.success { "succeeded" } else { "failed" },
            self.completed_nodes(),
            self.total_nodes(),
            self.duration_ms
        )?;
        for outcome in &self.outcomes {
            match &outcome.status {
                NodeStatus::Succeeded => {
                    writeln!(f, "  ok      {} ({}ms)", outcome.node, outcome.duration_ms)?
                }
                NodeStatus::Failed(e) => writeln!(f, "  failed  {}: {}", outcome.node, e)?,
                NodeStatus::Skipped => writeln!(f, "  skipped {}", outcome.node)?,
            }
        }
        Ok(())
    }
}

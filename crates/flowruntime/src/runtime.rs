use crate::executor::{ErrorHandling, ExecutionReport, WorkflowExecutor};
use crate::loader::WorkflowDocument;
use crate::registry::NodeRegistry;
use flowcore::{EventBus, ExecutionEvent, FlowError, Node, Workflow, WorkflowError};
use std::sync::Arc;

/// Main runtime: a registry of node kinds, an executor and an event bus
pub struct FlowRuntime {
    registry: Arc<NodeRegistry>,
    executor: WorkflowExecutor,
    event_bus: Arc<EventBus>,
}

impl FlowRuntime {
    /// Create a new runtime with default settings
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with an empty registry
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_registry(Arc::new(NodeRegistry::new()), config)
    }

    /// Create a new runtime with a pre-configured registry
    pub fn with_registry(registry: Arc<NodeRegistry>, config: RuntimeConfig) -> Self {
        Self {
            registry,
            executor: WorkflowExecutor::new(config.on_error),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Create a node of a registered kind
    pub fn create_node(&self, kind: &str, name: &str) -> Result<Node, WorkflowError> {
        self.registry.create_node(kind, name)
    }

    /// Resolve a workflow document against the registry and build it
    pub fn load(&self, document: &WorkflowDocument) -> Result<Workflow, FlowError> {
        document.build(&self.registry)
    }

    /// Execute a built workflow, publishing events on this runtime's bus
    pub fn execute(&self, workflow: &mut Workflow) -> ExecutionReport {
        self.executor.execute(workflow, &self.event_bus)
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for FlowRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub on_error: ErrorHandling,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
            on_error: ErrorHandling::ContinueOnError,
        }
    }
}

/// Run a workflow without setting up a runtime.
pub trait WorkflowExt {
    fn execute(&mut self) -> ExecutionReport;
}

impl WorkflowExt for Workflow {
    fn execute(&mut self) -> ExecutionReport {
        let config = RuntimeConfig::default();
        let event_bus = EventBus::new(config.event_buffer_size);
        WorkflowExecutor::new(config.on_error).execute(self, &event_bus)
    }
}

use flowcore::{Node, NodeDefinitionSchema, NodeStep, WorkflowError};
use std::collections::HashMap;
use std::sync::Arc;

/// A node kind that knows its own schema.
///
/// Implemented by built-in node libraries so they can be registered with
/// [`NodeRegistry::register_factory`].
pub trait NodeFactory: NodeStep + 'static {
    fn schema(&self) -> Result<NodeDefinitionSchema, WorkflowError>;
}

/// Registered node kind: immutable schema plus the step it runs
#[derive(Clone)]
pub struct NodeKind {
    pub schema: Arc<NodeDefinitionSchema>,
    pub step: Arc<dyn NodeStep>,
}

/// Lookup table from kind name to [`NodeKind`].
///
/// Populated at startup, then shared read-only (typically behind `Arc`).
#[derive(Default)]
pub struct NodeRegistry {
    kinds: HashMap<String, NodeKind>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema with the step that implements it
    pub fn register(
        &mut self,
        schema: NodeDefinitionSchema,
        step: Arc<dyn NodeStep>,
    ) -> Result<(), WorkflowError> {
        let kind = schema.kind().to_string();
        if self.kinds.contains_key(&kind) {
            return Err(WorkflowError::DuplicateNodeKind(kind));
        }
        tracing::info!("Registering node type: {}", kind);
        self.kinds.insert(
            kind,
            NodeKind {
                schema: Arc::new(schema),
                step,
            },
        );
        Ok(())
    }

    pub fn register_factory<F: NodeFactory>(&mut self, factory: F) -> Result<(), WorkflowError> {
        let schema = factory.schema()?;
        self.register(schema, Arc::new(factory))
    }

    /// Create an unconfigured node instance of a registered kind
    pub fn create_node(&self, kind: &str, name: &str) -> Result<Node, WorkflowError> {
        let entry = self
            .kinds
            .get(kind)
            .ok_or_else(|| WorkflowError::UnknownNodeKind(kind.to_string()))?;
        Ok(Node::new(name, entry.schema.clone(), entry.step.clone()))
    }

    /// Get all registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.kinds.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn schema(&self, kind: &str) -> Option<&Arc<NodeDefinitionSchema>> {
        self.kinds.get(kind).map(|entry| &entry.schema)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

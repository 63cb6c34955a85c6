//! Workflow execution runtime
//!
//! This crate runs built workflows, manages the registry of node kinds,
//! and loads declarative workflow documents.

mod executor;
mod loader;
mod registry;
mod runtime;

pub use executor::{ErrorHandling, ExecutionReport, NodeOutcome, NodeStatus, WorkflowExecutor};
pub use loader::{ConnectionDocument, NodeDocument, WorkflowDocument};
pub use registry::{NodeFactory, NodeKind, NodeRegistry};
pub use runtime::{FlowRuntime, RuntimeConfig, WorkflowExt};

//! Core abstractions for the flow engine
//!
//! This crate provides the graph model every other component depends on:
//! typed values and ports, node kind schemas, configured nodes, and the
//! builder that validates a graph into an executable [`Workflow`].

mod builder;
mod connection;
mod error;
pub mod events;
mod graph;
mod node;
mod port;
mod schema;
mod value;
mod workflow;

pub use builder::{BuilderState, WorkflowBuilder};
pub use connection::Connection;
pub use error::{FlowError, NodeError, WorkflowError};
pub use events::*;
pub use node::{Node, NodeContext, NodeMetadata, NodeOutput, NodeStep, RunState};
pub use port::{InputPort, OutputPort, PortDefinition, PortDirection};
pub use schema::{MethodDefinition, NodeDefinitionSchema, ParameterDefinition, SchemaBuilder};
pub use value::{PortType, Value};
pub use workflow::{Workflow, WorkflowId, WorkflowSummary};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

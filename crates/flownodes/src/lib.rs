//! Standard node library
//!
//! Collection of built-in nodes for common operations

mod debug;
mod math;
mod transform;

pub use debug::DebugNode;
pub use math::{AddNode, ConstantNode, DivideNode, ScaleNode};
pub use transform::{JsonParseNode, JsonStringifyNode};

use flowcore::WorkflowError;
use flowruntime::NodeRegistry;

/// Register all standard nodes with a registry
pub fn register_all(registry: &mut NodeRegistry) -> Result<(), WorkflowError> {
    registry.register_factory(DebugNode)?;
    registry.register_factory(ConstantNode)?;
    registry.register_factory(AddNode)?;
    registry.register_factory(ScaleNode)?;
    registry.register_factory(DivideNode)?;
    registry.register_factory(JsonParseNode)?;
    registry.register_factory(JsonStringifyNode)?;
    Ok(())
}

/// A registry holding only the standard nodes
pub fn standard_registry() -> Result<NodeRegistry, WorkflowError> {
    let mut registry = NodeRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

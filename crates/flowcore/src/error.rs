use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors attributable to a single node: configuration, port access and
/// step execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Unknown parameter '{parameter}' for node kind '{kind}'")]
    UnknownParameter { kind: String, parameter: String },

    #[error("Type mismatch for '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Missing required parameter '{parameter}' on node '{node}'")]
    MissingParameter { node: String, parameter: String },

    #[error("Unknown port '{port}' on node '{node}'")]
    UnknownPort { node: String, port: String },

    #[error("Port '{0}' has no value")]
    PortNotSet(String),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Required output '{0}' was not produced")]
    OutputNotProduced(String),

    #[error(
        "Input '{port}' expects a value from {source_node}.{source_port}, which was not produced"
    )]
    UpstreamValueMissing {
        port: String,
        source_node: String,
        source_port: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Errors raised while assembling, validating or registering graphs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Unknown port '{port}' on node '{node}'")]
    UnknownPort { node: String, port: String },

    #[error("Invalid connection {connection}: {reason}")]
    InvalidConnection { connection: String, reason: String },

    #[error("Input port {node}.{port} is already connected")]
    PortAlreadyConnected { node: String, port: String },

    #[error("Cyclic dependency detected between nodes: {}", nodes.join(", "))]
    CyclicGraph { nodes: Vec<String> },

    #[error("Required input {node}.{port} has neither a connection nor a value")]
    UnsatisfiedInput { node: String, port: String },

    #[error("Cannot {operation} while the builder is {state}")]
    InvalidBuilderState { state: String, operation: String },

    #[error("Input {node}.{port} is driven by a connection and cannot be seeded")]
    InputDrivenByConnection { node: String, port: String },

    #[error("Invalid schema '{kind}': {reason}")]
    InvalidSchema { kind: String, reason: String },

    #[error("Unknown node type: {0}")]
    UnknownNodeKind(String),

    #[error("Node type already registered: {0}")]
    DuplicateNodeKind(String),
}

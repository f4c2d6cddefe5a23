use crate::flow::Direction;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid flow definition: {0}")]
    InvalidFlowDefinition(String),

    #[error("Flow definition has no start node")]
    MissingStartNode,

    #[error("Node '{node_id}' failed: {source}")]
    NodeExecutionFailed {
        node_id: String,
        #[source]
        source: NodeError,
    },

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures raised while executing a single node's work, wrapped by
/// the engine into `FlowError::NodeExecutionFailed` with the node id.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

#[derive(Error, Debug)]
pub enum AdapterError {
    /// Resolution failure, distinct from an executor's own runtime
    /// failure.
    #[error("No adapter executor registered for type '{adapter_type}' with direction '{direction}'")]
    UnsupportedCombination {
        adapter_type: String,
        direction: Direction,
    },

    #[error("Adapter configuration invalid: {0}")]
    ConfigurationInvalid(String),

    #[error("Adapter execution failed: {0}")]
    ExecutionFailed(String),
}

/// Structural problems found by `FlowDefinition::validate`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Definition contains no nodes")]
    EmptyNodeList,

    #[error("Definition has no start node")]
    MissingStartNode,

    #[error("Definition has {0} start nodes, expected exactly one")]
    MultipleStartNodes(usize),

    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("Edge references unknown node: {0}")]
    UnknownEdgeEndpoint(String),

    #[error("Definition contains a cycle")]
    CyclicDefinition,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Step not found: {0}")]
    StepNotFound(uuid::Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

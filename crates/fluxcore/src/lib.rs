//! Core abstractions for the integration-flow engine
//!
//! This crate provides the fundamental types that all other components
//! depend on: the flow definition graph, execution and step records,
//! the execution context, and the notification event bus.

mod context;
mod error;
pub mod events;
mod execution;
mod flow;
mod value;

pub use context::{ContextData, ExecutionContext};
pub use error::{AdapterError, DefinitionError, FlowError, NodeError, RepositoryError};
pub use events::{EventBus, EventEmitter, ExecutionEvent};
pub use execution::{Execution, ExecutionId, ExecutionStatus, ExecutionStep, StepStatus, StepType};
pub use flow::{Direction, Edge, FlowDefinition, FlowId, Node, NodeType};
pub use value::Value;

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

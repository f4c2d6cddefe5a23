//! Flow execution runtime
//!
//! This crate provides the traversal engine that drives one flow run
//! end to end: adapter dispatch, step lifecycle tracking against a
//! pluggable repository, and depth-first successor traversal.

mod engine;
mod handler;
mod registry;
mod repository;
mod runtime;
mod tracker;

pub use engine::{FlowExecutor, SuccessorResolver};
pub use handler::NodeHandler;
pub use registry::{AdapterDescriptor, AdapterExecutor, AdapterRegistry};
pub use repository::{InMemoryStepRepository, StepRepository};
pub use runtime::{FlowRuntime, RuntimeConfig};
pub use tracker::StepTracker;

use async_trait::async_trait;
use fluxcore::{ContextData, ExecutionContext, ExecutionStep, Node, NodeError};

/// Execution contract for non-adapter node types (utility, condition,
/// wait, notification, ...). The engine calls this for every node that
/// does not dispatch through the adapter registry.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    async fn execute_node(
        &self,
        step: &ExecutionStep,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<ContextData, NodeError>;
}

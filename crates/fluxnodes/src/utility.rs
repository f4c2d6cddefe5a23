use async_trait::async_trait;
use fluxcore::{ContextData, ExecutionContext, ExecutionStep, Node, NodeError, Value};
use fluxruntime::NodeHandler;

/// Default handler: logs the visit and returns the node's configured
/// `output` object, if any, as the result map. Start, end and unknown
/// node types all land here.
pub struct UtilityHandler;

#[async_trait]
impl NodeHandler for UtilityHandler {
    async fn execute_node(
        &self,
        step: &ExecutionStep,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<ContextData, NodeError> {
        tracing::info!(
            "Utility node '{}' (step {}, {} context keys)",
            node.id,
            step.step_order,
            context.len()
        );

        let mut output = ContextData::new();
        if let Some(Value::Object(map)) = node.config.get("output") {
            for (key, value) in map {
                output.insert(key.clone(), value.clone());
            }
        }
        Ok(output)
    }
}

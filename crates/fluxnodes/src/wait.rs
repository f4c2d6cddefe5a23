use async_trait::async_trait;
use fluxcore::{ContextData, ExecutionContext, ExecutionStep, Node, NodeError, Value};
use fluxruntime::NodeHandler;
use tokio::time::{sleep, Duration};

/// Suspends the traversal for `durationMs` from the node config. The
/// wait blocks this execution only; other executions are unaffected.
pub struct WaitHandler;

#[async_trait]
impl NodeHandler for WaitHandler {
    async fn execute_node(
        &self,
        _step: &ExecutionStep,
        node: &Node,
        _context: &ExecutionContext,
    ) -> Result<ContextData, NodeError> {
        let duration_ms = node
            .config
            .get("durationMs")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        if duration_ms > 0 {
            tracing::debug!("Wait node '{}': sleeping {}ms", node.id, duration_ms);
            sleep(Duration::from_millis(duration_ms)).await;
        }

        let mut output = ContextData::new();
        output.insert("waitedMs".to_string(), Value::from(duration_ms as i64));
        Ok(output)
    }
}

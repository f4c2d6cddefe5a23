use async_trait::async_trait;
use fluxcore::{ContextData, ExecutionContext, ExecutionStep, Node, NodeError, NodeType};
use fluxruntime::NodeHandler;

/// Routes non-adapter nodes to the built-in handler for their type.
/// Unknown and utility types both fall through to the utility handler,
/// matching the engine's don't-fail-on-unknown policy.
pub struct NodeHandlerRouter {
    utility: crate::UtilityHandler,
    condition: crate::ConditionHandler,
    wait: crate::WaitHandler,
    notify: crate::WebhookNotificationHandler,
}

impl NodeHandlerRouter {
    pub fn new() -> Self {
        Self {
            utility: crate::UtilityHandler,
            condition: crate::ConditionHandler,
            wait: crate::WaitHandler,
            notify: crate::WebhookNotificationHandler::new(),
        }
    }

    /// Node types with a dedicated handler; everything else is
    /// utility.
    pub fn handled_types() -> &'static [(&'static str, &'static str)] {
        &[
            ("condition / decision", "evaluate a comparison against the context"),
            ("wait", "suspend the traversal for a configured duration"),
            ("notification", "POST a progress notification to a webhook"),
            ("utility (default)", "log the visit, pass configured output through"),
        ]
    }
}

impl Default for NodeHandlerRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeHandler for NodeHandlerRouter {
    async fn execute_node(
        &self,
        step: &ExecutionStep,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<ContextData, NodeError> {
        match node.node_type {
            NodeType::Condition | NodeType::Decision => {
                self.condition.execute_node(step, node, context).await
            }
            NodeType::Wait => self.wait.execute_node(step, node, context).await,
            NodeType::Notification => self.notify.execute_node(step, node, context).await,
            _ => self.utility.execute_node(step, node, context).await,
        }
    }
}

use async_trait::async_trait;
use fluxcore::{ContextData, ExecutionContext, ExecutionStep, Node, NodeError, Value};
use fluxruntime::NodeHandler;

/// Posts an execution-progress notification to a configured webhook
/// URL. This is a node's own work: a delivery failure fails the node,
/// unlike the fire-and-forget event bus.
pub struct WebhookNotificationHandler {
    client: reqwest::Client,
}

impl WebhookNotificationHandler {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WebhookNotificationHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeHandler for WebhookNotificationHandler {
    async fn execute_node(
        &self,
        step: &ExecutionStep,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<ContextData, NodeError> {
        let url = node
            .config
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                NodeError::Configuration("notification node needs a 'url'".to_string())
            })?;

        let message = node
            .config
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("flow execution update");

        let body = serde_json::json!({
            "executionId": step.execution_id,
            "nodeId": node.id,
            "stepOrder": step.step_order,
            "message": message,
            "contextKeys": context.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(),
        });

        tracing::info!("Notification node '{}': POST {}", node.id, url);

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NodeError::ExecutionFailed(format!("webhook delivery failed: {}", e)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(NodeError::ExecutionFailed(format!(
                "webhook returned status {}",
                status
            )));
        }

        let mut output = ContextData::new();
        output.insert("notified".to_string(), Value::Bool(true));
        output.insert("notificationStatus".to_string(), Value::from(status as i64));
        Ok(output)
    }
}

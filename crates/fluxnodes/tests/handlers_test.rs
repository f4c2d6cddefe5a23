use fluxcore::{
    ContextData, ExecutionContext, ExecutionStep, Node, NodeError, NodeType, StepStatus, StepType,
    Value,
};
use fluxnodes::{ConditionHandler, NodeHandlerRouter, UtilityHandler, WaitHandler, WebhookNotificationHandler};
use fluxruntime::NodeHandler;
use std::collections::HashMap;
use uuid::Uuid;

fn make_step(node: &Node) -> ExecutionStep {
    ExecutionStep {
        id: Uuid::new_v4(),
        execution_id: Uuid::new_v4(),
        step_id: node.id.clone(),
        step_type: StepType::for_node_type(node.node_type),
        step_order: 1,
        step_status: StepStatus::Running,
        started_at: chrono::Utc::now(),
        completed_at: None,
        duration_ms: None,
        input_data: ContextData::new(),
        output_data: None,
        error_message: None,
        correlation_id: None,
    }
}

fn object(pairs: &[(&str, Value)]) -> Value {
    let map: HashMap<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    Value::Object(map)
}

#[tokio::test]
async fn utility_returns_configured_output() {
    let node = Node::new("stamp", NodeType::Utility)
        .with_config("output", object(&[("stamped", Value::Bool(true))]));
    let step = make_step(&node);
    let context = ExecutionContext::new();

    let output = UtilityHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();

    assert_eq!(output.get("stamped"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn utility_without_output_config_returns_empty_map() {
    let node = Node::new("noop", NodeType::Utility);
    let step = make_step(&node);
    let context = ExecutionContext::new();

    let output = UtilityHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();

    assert!(output.is_empty());
}

#[tokio::test]
async fn condition_compares_context_values() {
    let mut context = ExecutionContext::new();
    context.insert("amount", 150i64);

    let node = Node::new("check", NodeType::Condition)
        .with_config("field", "amount")
        .with_config("operator", "gt")
        .with_config("value", 100i64);
    let step = make_step(&node);

    let output = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();
    assert_eq!(output.get("conditionResult"), Some(&Value::Bool(true)));

    let node = Node::new("check", NodeType::Condition)
        .with_config("field", "amount")
        .with_config("operator", "eq")
        .with_config("value", 100i64);
    let output = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();
    assert_eq!(output.get("conditionResult"), Some(&Value::Bool(false)));
}

#[tokio::test]
async fn condition_exists_operator_checks_presence() {
    let mut context = ExecutionContext::new();
    context.insert("present", "yes");

    let node = Node::new("check", NodeType::Condition)
        .with_config("field", "present")
        .with_config("operator", "exists");
    let step = make_step(&node);

    let output = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();
    assert_eq!(output.get("conditionResult"), Some(&Value::Bool(true)));

    let node = Node::new("check", NodeType::Condition)
        .with_config("field", "absent")
        .with_config("operator", "exists");
    let output = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();
    assert_eq!(output.get("conditionResult"), Some(&Value::Bool(false)));
}

#[tokio::test]
async fn condition_rejects_bad_configuration() {
    let context = ExecutionContext::new();

    let node = Node::new("check", NodeType::Condition);
    let step = make_step(&node);
    let err = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Configuration(_)));

    let node = Node::new("check", NodeType::Condition)
        .with_config("field", "x")
        .with_config("operator", "between");
    let err = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Configuration(_)));
}

#[tokio::test]
async fn condition_gt_needs_numeric_operands() {
    let mut context = ExecutionContext::new();
    context.insert("name", "alice");

    let node = Node::new("check", NodeType::Condition)
        .with_config("field", "name")
        .with_config("operator", "gt")
        .with_config("value", 10i64);
    let step = make_step(&node);

    let err = ConditionHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::ExecutionFailed(_)));
}

#[tokio::test]
async fn wait_sleeps_for_configured_duration() {
    let node = Node::new("pause", NodeType::Wait).with_config("durationMs", 50i64);
    let step = make_step(&node);
    let context = ExecutionContext::new();

    let started = std::time::Instant::now();
    let output = WaitHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();

    assert!(started.elapsed().as_millis() >= 50);
    assert_eq!(output.get("waitedMs"), Some(&Value::from(50i64)));
}

#[tokio::test]
async fn wait_defaults_to_no_delay() {
    let node = Node::new("pause", NodeType::Wait);
    let step = make_step(&node);
    let context = ExecutionContext::new();

    let output = WaitHandler
        .execute_node(&step, &node, &context)
        .await
        .unwrap();
    assert_eq!(output.get("waitedMs"), Some(&Value::from(0i64)));
}

#[tokio::test]
async fn webhook_requires_a_url() {
    let node = Node::new("notify", NodeType::Notification);
    let step = make_step(&node);
    let context = ExecutionContext::new();

    let err = WebhookNotificationHandler::new()
        .execute_node(&step, &node, &context)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Configuration(_)));
}

#[tokio::test]
#[ignore] // Needs a webhook receiver listening on localhost:9999
async fn webhook_posts_to_configured_url() {
    let node = Node::new("notify", NodeType::Notification)
        .with_config("url", "http://127.0.0.1:9999/hook")
        .with_config("message", "integration test");
    let step = make_step(&node);
    let context = ExecutionContext::new();

    let output = WebhookNotificationHandler::new()
        .execute_node(&step, &node, &context)
        .await
        .unwrap();
    assert_eq!(output.get("notified"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn router_dispatches_by_node_type() {
    let router = NodeHandlerRouter::new();
    let context = ExecutionContext::new();

    let condition = Node::new("check", NodeType::Decision)
        .with_config("field", "missing")
        .with_config("operator", "exists");
    let step = make_step(&condition);
    let output = router
        .execute_node(&step, &condition, &context)
        .await
        .unwrap();
    assert_eq!(output.get("conditionResult"), Some(&Value::Bool(false)));

    // Unknown types fall through to the utility handler.
    let unknown = Node::new("mystery", NodeType::Unknown)
        .with_config("output", object(&[("handled", Value::Bool(true))]));
    let step = make_step(&unknown);
    let output = router.execute_node(&step, &unknown, &context).await.unwrap();
    assert_eq!(output.get("handled"), Some(&Value::Bool(true)));
}

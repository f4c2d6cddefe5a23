use async_trait::async_trait;
use fluxcore::{ContextData, ExecutionContext, ExecutionStep, Node, NodeError, Value};
use fluxruntime::NodeHandler;

/// Evaluates a comparison against the execution context and records
/// the result as `conditionResult`. The engine still follows every
/// outgoing edge; routing on the result is a modeling concern.
pub struct ConditionHandler;

impl ConditionHandler {
    fn evaluate(operator: &str, actual: Option<&Value>, expected: Option<&Value>) -> Result<bool, NodeError> {
        match operator {
            "exists" => Ok(actual.is_some()),
            "eq" => Ok(Self::values_equal(actual, expected)),
            "ne" => Ok(!Self::values_equal(actual, expected)),
            "gt" => Self::compare(actual, expected).map(|ord| ord == std::cmp::Ordering::Greater),
            "lt" => Self::compare(actual, expected).map(|ord| ord == std::cmp::Ordering::Less),
            other => Err(NodeError::Configuration(format!(
                "unknown condition operator: {}",
                other
            ))),
        }
    }

    fn values_equal(actual: Option<&Value>, expected: Option<&Value>) -> bool {
        match (actual, expected) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn compare(
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<std::cmp::Ordering, NodeError> {
        let (a, b) = match (actual.and_then(Value::as_f64), expected.and_then(Value::as_f64)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(NodeError::ExecutionFailed(
                    "condition operands are not both numeric".to_string(),
                ))
            }
        };
        a.partial_cmp(&b)
            .ok_or_else(|| NodeError::ExecutionFailed("condition operands are not comparable".to_string()))
    }
}

#[async_trait]
impl NodeHandler for ConditionHandler {
    async fn execute_node(
        &self,
        _step: &ExecutionStep,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<ContextData, NodeError> {
        let field = node
            .config
            .get("field")
            .and_then(Value::as_str)
            .ok_or_else(|| NodeError::Configuration("condition node needs a 'field'".to_string()))?;
        let operator = node
            .config
            .get("operator")
            .and_then(Value::as_str)
            .unwrap_or("exists");

        let actual = context.get(field);
        let expected = node.config.get("value");
        let result = Self::evaluate(operator, actual, expected)?;

        tracing::debug!(
            "Condition '{}': {} {} -> {}",
            node.id,
            field,
            operator,
            result
        );

        let mut output = ContextData::new();
        output.insert("conditionResult".to_string(), Value::Bool(result));
        Ok(output)
    }
}

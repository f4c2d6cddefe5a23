use crate::context::ContextData;
use crate::flow::{FlowId, NodeType};
use crate::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub type ExecutionId = Uuid;

/// One run instance of a flow definition. Created by the caller
/// (scheduler, server, CLI) before the engine is invoked; the engine
/// records its trace through execution steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: ExecutionId,
    pub flow_id: FlowId,
    pub status: ExecutionStatus,
    /// Initial seed for the execution context.
    #[serde(default)]
    pub payload: HashMap<String, Value>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub triggered_by: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Execution {
    pub fn new(flow_id: FlowId) -> Self {
        Self {
            id: Uuid::new_v4(),
            flow_id,
            status: ExecutionStatus::Pending,
            payload: HashMap::new(),
            correlation_id: None,
            triggered_by: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_payload(mut self, payload: HashMap<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_triggered_by(mut self, triggered_by: impl Into<String>) -> Self {
        self.triggered_by = Some(triggered_by.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// The recorded execution of a single node within one execution.
/// Exclusively owned by its execution and mutated only by the step
/// tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub id: Uuid,
    pub execution_id: ExecutionId,
    /// Id of the node this step recorded.
    pub step_id: String,
    pub step_type: StepType,
    /// 1-based, monotonically increasing per execution in traversal
    /// order.
    pub step_order: u32,
    pub step_status: StepStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Snapshot of the execution context at node entry.
    #[serde(default)]
    pub input_data: ContextData,
    /// Result map merged back into the context on success.
    #[serde(default)]
    pub output_data: Option<ContextData>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Running,
    Completed,
    Failed,
}

/// Step classification recorded on the trace. `Split` is metadata
/// only; fan-out still runs sequentially and depth-first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    AdapterSender,
    AdapterReceiver,
    Utility,
    Decision,
    Split,
    Wait,
    Notification,
}

impl StepType {
    /// Fixed node-type to step-type mapping. Unrecognized node types
    /// are recorded as utility steps instead of failing the flow.
    pub fn for_node_type(node_type: NodeType) -> StepType {
        match node_type {
            NodeType::Start | NodeType::Adapter | NodeType::Sender => StepType::AdapterSender,
            NodeType::End | NodeType::MessageEnd | NodeType::Receiver => StepType::AdapterReceiver,
            NodeType::Condition | NodeType::Decision => StepType::Decision,
            NodeType::Parallel | NodeType::ParallelSplit => StepType::Split,
            NodeType::Wait => StepType::Wait,
            NodeType::Notification => StepType::Notification,
            NodeType::Utility | NodeType::Unknown => StepType::Utility,
        }
    }
}

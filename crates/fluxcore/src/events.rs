use crate::execution::{ExecutionId, ExecutionStep, StepType};
use crate::flow::FlowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Progress events published during flow execution. Delivery is
/// fire-and-forget: a slow or absent subscriber never affects the
/// traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExecutionEvent {
    #[serde(rename_all = "camelCase")]
    ExecutionStarted {
        execution_id: ExecutionId,
        flow_id: FlowId,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ExecutionCompleted {
        execution_id: ExecutionId,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    StepStarted {
        execution_id: ExecutionId,
        node_id: String,
        step_type: StepType,
        step_order: u32,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    StepCompleted {
        execution_id: ExecutionId,
        node_id: String,
        step_order: u32,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    StepFailed {
        execution_id: ExecutionId,
        node_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// Emitter scoped to one execution
#[derive(Clone)]
pub struct EventEmitter {
    execution_id: ExecutionId,
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventEmitter {
    pub fn new(execution_id: ExecutionId, sender: broadcast::Sender<ExecutionEvent>) -> Self {
        Self {
            execution_id,
            sender,
        }
    }

    fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn execution_started(&self, flow_id: FlowId) {
        self.emit(ExecutionEvent::ExecutionStarted {
            execution_id: self.execution_id,
            flow_id,
            timestamp: Utc::now(),
        });
    }

    pub fn execution_completed(&self, success: bool, duration_ms: u64) {
        self.emit(ExecutionEvent::ExecutionCompleted {
            execution_id: self.execution_id,
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
    }

    pub fn step_started(&self, step: &ExecutionStep) {
        self.emit(ExecutionEvent::StepStarted {
            execution_id: self.execution_id,
            node_id: step.step_id.clone(),
            step_type: step.step_type,
            step_order: step.step_order,
            timestamp: Utc::now(),
        });
    }

    pub fn step_completed(&self, step: &ExecutionStep) {
        self.emit(ExecutionEvent::StepCompleted {
            execution_id: self.execution_id,
            node_id: step.step_id.clone(),
            step_order: step.step_order,
            duration_ms: step.duration_ms.unwrap_or(0),
            timestamp: Utc::now(),
        });
    }

    pub fn step_failed(&self, step: &ExecutionStep) {
        self.emit(ExecutionEvent::StepFailed {
            execution_id: self.execution_id,
            node_id: step.step_id.clone(),
            error: step
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
            timestamp: Utc::now(),
        });
    }
}

/// In-process notification sink backed by a broadcast channel
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn create_emitter(&self, execution_id: ExecutionId) -> EventEmitter {
        EventEmitter::new(execution_id, self.sender.clone())
    }
}

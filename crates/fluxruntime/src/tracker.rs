use crate::repository::StepRepository;
use chrono::Utc;
use fluxcore::{
    ContextData, Execution, ExecutionContext, ExecutionId, ExecutionStep, Node, RepositoryError,
    StepStatus, StepType,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates, completes and fails one step record per node visited.
/// Every opened step is closed before the traversal proceeds past its
/// node, including the error path.
pub struct StepTracker {
    repository: Arc<dyn StepRepository>,
}

impl StepTracker {
    pub fn new(repository: Arc<dyn StepRepository>) -> Self {
        Self { repository }
    }

    /// Order seed for a traversal: count of already-persisted steps
    /// plus one. Called once per execution; the engine then advances
    /// the counter in memory so ordering never races the repository.
    pub async fn next_order(&self, execution_id: ExecutionId) -> Result<u32, RepositoryError> {
        let existing = self.repository.find_by_execution_id(execution_id).await?;
        Ok(existing.len() as u32 + 1)
    }

    /// Open a step for a node visit: status RUNNING, context snapshot
    /// as input data, persisted before the node's work begins.
    pub async fn open_step(
        &self,
        execution: &Execution,
        node: &Node,
        step_order: u32,
        context: &ExecutionContext,
    ) -> Result<ExecutionStep, RepositoryError> {
        let step = ExecutionStep {
            id: Uuid::new_v4(),
            execution_id: execution.id,
            step_id: node.id.clone(),
            step_type: StepType::for_node_type(node.node_type),
            step_order,
            step_status: StepStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            duration_ms: None,
            input_data: context.snapshot(),
            output_data: None,
            error_message: None,
            correlation_id: execution.correlation_id.clone(),
        };

        tracing::debug!(
            "Opening step {} for node '{}' ({:?})",
            step.step_order,
            step.step_id,
            step.step_type
        );

        self.repository.save(step.clone()).await?;
        Ok(step)
    }

    pub async fn close_completed(
        &self,
        mut step: ExecutionStep,
        output: ContextData,
    ) -> Result<ExecutionStep, RepositoryError> {
        let completed_at = Utc::now();
        step.step_status = StepStatus::Completed;
        step.duration_ms = Some(
            (completed_at - step.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
        step.completed_at = Some(completed_at);
        step.output_data = Some(output);

        self.repository.update(step.clone()).await?;
        Ok(step)
    }

    pub async fn close_failed(
        &self,
        mut step: ExecutionStep,
        error_message: &str,
    ) -> Result<ExecutionStep, RepositoryError> {
        let completed_at = Utc::now();
        step.step_status = StepStatus::Failed;
        step.duration_ms = Some(
            (completed_at - step.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
        step.completed_at = Some(completed_at);
        step.error_message = Some(error_message.to_string());

        self.repository.update(step.clone()).await?;
        Ok(step)
    }
}

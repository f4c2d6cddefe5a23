use async_trait::async_trait;
use fluxcore::{ExecutionId, ExecutionStep, RepositoryError};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence contract for execution steps. The engine only needs
/// save, update and an ordered per-execution listing.
#[async_trait]
pub trait StepRepository: Send + Sync {
    async fn save(&self, step: ExecutionStep) -> Result<Uuid, RepositoryError>;

    async fn update(&self, step: ExecutionStep) -> Result<(), RepositoryError>;

    /// Steps of one execution, ordered by step order.
    async fn find_by_execution_id(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<ExecutionStep>, RepositoryError>;
}

/// In-memory repository used by the CLI, the server and tests.
pub struct InMemoryStepRepository {
    steps: RwLock<HashMap<ExecutionId, Vec<ExecutionStep>>>,
}

impl InMemoryStepRepository {
    pub fn new() -> Self {
        Self {
            steps: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStepRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepRepository for InMemoryStepRepository {
    async fn save(&self, step: ExecutionStep) -> Result<Uuid, RepositoryError> {
        let mut steps = self.steps.write().await;
        let id = step.id;
        steps.entry(step.execution_id).or_default().push(step);
        Ok(id)
    }

    async fn update(&self, step: ExecutionStep) -> Result<(), RepositoryError> {
        let mut steps = self.steps.write().await;
        let existing = steps
            .get_mut(&step.execution_id)
            .and_then(|list| list.iter_mut().find(|s| s.id == step.id))
            .ok_or(RepositoryError::StepNotFound(step.id))?;
        *existing = step;
        Ok(())
    }

    async fn find_by_execution_id(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<ExecutionStep>, RepositoryError> {
        let steps = self.steps.read().await;
        let mut list = steps.get(&execution_id).cloned().unwrap_or_default();
        list.sort_by_key(|s| s.step_order);
        Ok(list)
    }
}

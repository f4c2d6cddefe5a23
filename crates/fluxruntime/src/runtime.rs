use crate::engine::FlowExecutor;
use crate::handler::NodeHandler;
use crate::registry::AdapterRegistry;
use crate::repository::{InMemoryStepRepository, StepRepository};
use crate::tracker::StepTracker;
use fluxcore::{
    EventBus, Execution, ExecutionContext, ExecutionId, ExecutionStep, FlowDefinition, FlowError,
    RepositoryError,
};
use std::sync::Arc;

/// Main entry point for embedding the engine: bundles the adapter
/// registry, node handler, step repository and event bus behind one
/// facade.
pub struct FlowRuntime {
    registry: Arc<AdapterRegistry>,
    repository: Arc<dyn StepRepository>,
    executor: FlowExecutor,
    event_bus: Arc<EventBus>,
}

impl FlowRuntime {
    /// Runtime with an empty adapter registry and in-memory step
    /// storage.
    pub fn new(handler: Arc<dyn NodeHandler>) -> Self {
        Self::with_config(handler, RuntimeConfig::default())
    }

    pub fn with_config(handler: Arc<dyn NodeHandler>, config: RuntimeConfig) -> Self {
        Self::with_registry(
            Arc::new(AdapterRegistry::new()),
            Arc::new(InMemoryStepRepository::new()),
            handler,
            config,
        )
    }

    pub fn with_registry(
        registry: Arc<AdapterRegistry>,
        repository: Arc<dyn StepRepository>,
        handler: Arc<dyn NodeHandler>,
        config: RuntimeConfig,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        let tracker = StepTracker::new(repository.clone());
        let executor = FlowExecutor::new(
            registry.clone(),
            tracker,
            handler,
            event_bus.clone(),
        );

        Self {
            registry,
            repository,
            executor,
            event_bus,
        }
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    /// Drive one execution of a flow definition to completion.
    pub async fn execute(
        &self,
        execution: &Execution,
        definition: &FlowDefinition,
    ) -> Result<ExecutionContext, FlowError> {
        self.executor.execute_flow_steps(execution, definition).await
    }

    /// The recorded trace of an execution, ordered by step order.
    pub async fn steps(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<ExecutionStep>, RepositoryError> {
        self.repository.find_by_execution_id(execution_id).await
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<fluxcore::ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
        }
    }
}

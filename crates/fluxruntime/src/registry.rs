use async_trait::async_trait;
use fluxcore::{AdapterError, ContextData, Direction, ExecutionContext, ExecutionStep, Node, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything an executor needs to know about the adapter it is
/// driving: identity, declared type and direction, and the node's
/// configuration block.
#[derive(Debug, Clone)]
pub struct AdapterDescriptor {
    pub adapter_id: String,
    pub adapter_type: String,
    pub direction: Direction,
    pub config: HashMap<String, Value>,
}

impl AdapterDescriptor {
    /// Build a descriptor from an adapter-bearing node. The node must
    /// carry id, type and direction; anything missing is a
    /// configuration error, not a dispatch failure.
    pub fn from_node(node: &Node) -> Result<Self, AdapterError> {
        let adapter_id = node.adapter_id.clone().ok_or_else(|| {
            AdapterError::ConfigurationInvalid(format!("node '{}' has no adapterId", node.id))
        })?;
        let adapter_type = node.adapter_type.clone().ok_or_else(|| {
            AdapterError::ConfigurationInvalid(format!("node '{}' has no adapterType", node.id))
        })?;
        let direction = node.direction.ok_or_else(|| {
            AdapterError::ConfigurationInvalid(format!("node '{}' has no direction", node.id))
        })?;

        Ok(Self {
            adapter_id,
            adapter_type,
            direction,
            config: node.config.clone(),
        })
    }
}

/// Capability contract for protocol adapters. Implementations are
/// supplied by the embedding application; this crate never performs
/// adapter I/O itself.
#[async_trait]
pub trait AdapterExecutor: Send + Sync {
    /// Run the adapter's work and return the result map to merge into
    /// the execution context.
    async fn execute(
        &self,
        descriptor: &AdapterDescriptor,
        context: &ExecutionContext,
        step: &ExecutionStep,
    ) -> Result<ContextData, AdapterError>;

    /// Validate the adapter configuration before execution.
    fn validate_configuration(&self, _descriptor: &AdapterDescriptor) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Registry of adapter executors keyed on (type, direction). Executors
/// are registered once and resolved per node; resolution failure is
/// distinct from an executor's own runtime failure.
pub struct AdapterRegistry {
    executors: HashMap<(String, Direction), Arc<dyn AdapterExecutor>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        adapter_type: impl Into<String>,
        direction: Direction,
        executor: Arc<dyn AdapterExecutor>,
    ) {
        let adapter_type = adapter_type.into();
        tracing::info!("Registering adapter executor: {} ({})", adapter_type, direction);
        self.executors.insert((adapter_type, direction), executor);
    }

    pub fn resolve(
        &self,
        descriptor: &AdapterDescriptor,
    ) -> Result<Arc<dyn AdapterExecutor>, AdapterError> {
        self.executors
            .get(&(descriptor.adapter_type.clone(), descriptor.direction))
            .cloned()
            .ok_or_else(|| AdapterError::UnsupportedCombination {
                adapter_type: descriptor.adapter_type.clone(),
                direction: descriptor.direction,
            })
    }

    /// All registered (type, direction) pairs.
    pub fn combinations(&self) -> Vec<(String, Direction)> {
        self.executors.keys().cloned().collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use crate::{Execution, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered key/value data, used for the live context and for
/// step input/output snapshots.
pub type ContextData = IndexMap<String, Value>;

/// Mutable key/value state carried across node executions within one
/// run. Seeded from the execution payload plus the execution and flow
/// identifiers, then grown additively as each node's output is merged
/// in. One execution owns exactly one context; access is sequential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    data: ContextData,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(execution: &Execution) -> Self {
        let mut context = Self::new();
        for (key, value) in &execution.payload {
            context.insert(key.clone(), value.clone());
        }
        context.insert("executionId", execution.id.to_string());
        context.insert("flowId", execution.flow_id.to_string());
        if let Some(triggered_by) = &execution.triggered_by {
            context.insert("triggeredBy", triggered_by.clone());
        }
        context
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Additive merge: later keys win, existing keys are never
    /// removed.
    pub fn merge(&mut self, output: ContextData) {
        for (key, value) in output {
            self.data.insert(key, value);
        }
    }

    /// Copy of the current state, taken for step input snapshots.
    pub fn snapshot(&self) -> ContextData {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

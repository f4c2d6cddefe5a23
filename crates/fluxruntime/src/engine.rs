use crate::handler::NodeHandler;
use crate::registry::{AdapterDescriptor, AdapterRegistry};
use crate::tracker::StepTracker;
use fluxcore::{
    ContextData, EventBus, EventEmitter, Execution, ExecutionContext, ExecutionStep, FlowDefinition,
    FlowError, Node, NodeError, NodeType,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;

/// Successor strategy, picked once per flow definition so a single
/// traversal never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessorResolver {
    /// Follow every edge whose source is the current node, in
    /// edge-list order.
    EdgeList,
    /// No edges present: scan for nodes whose parent link points at
    /// the current node, in node-list order.
    ParentLink,
}

impl SuccessorResolver {
    pub fn for_definition(definition: &FlowDefinition) -> Self {
        if definition.edges.is_empty() {
            SuccessorResolver::ParentLink
        } else {
            SuccessorResolver::EdgeList
        }
    }

    pub fn successors<'a>(&self, node: &Node, definition: &'a FlowDefinition) -> Vec<&'a Node> {
        match self {
            SuccessorResolver::EdgeList => definition
                .edges
                .iter()
                .filter(|edge| edge.source == node.id)
                .filter_map(|edge| definition.find_node_by_id(&edge.target))
                .collect(),
            SuccessorResolver::ParentLink => definition
                .nodes
                .iter()
                .filter(|candidate| candidate.parent_id.as_deref() == Some(node.id.as_str()))
                .collect(),
        }
    }
}

/// Drives one flow run end to end: locates the start node, executes
/// each node, records its step, merges output into the context and
/// recurses into successors depth-first. The first node failure aborts
/// the whole execution.
pub struct FlowExecutor {
    registry: Arc<AdapterRegistry>,
    tracker: StepTracker,
    handler: Arc<dyn NodeHandler>,
    event_bus: Arc<EventBus>,
}

impl FlowExecutor {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        tracker: StepTracker,
        handler: Arc<dyn NodeHandler>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            registry,
            tracker,
            handler,
            event_bus,
        }
    }

    /// Execute all steps of one flow run. Returns the final execution
    /// context on success.
    pub async fn execute_flow_steps(
        &self,
        execution: &Execution,
        definition: &FlowDefinition,
    ) -> Result<ExecutionContext, FlowError> {
        if definition.nodes.is_empty() {
            return Err(FlowError::InvalidFlowDefinition(
                "definition contains no nodes".to_string(),
            ));
        }

        // No step is created until a start node is known to exist.
        let start = definition
            .find_node_by_type(NodeType::Start)
            .ok_or(FlowError::MissingStartNode)?;

        let mut context = ExecutionContext::seed(execution);
        let resolver = SuccessorResolver::for_definition(definition);
        let mut order = self.tracker.next_order(execution.id).await?;

        let emitter = self.event_bus.create_emitter(execution.id);
        emitter.execution_started(execution.flow_id);

        tracing::info!(
            "Starting flow execution {} (flow {})",
            execution.id,
            execution.flow_id
        );

        let started = Instant::now();
        let result = self
            .execute_node(execution, start, definition, resolver, &mut context, &mut order, &emitter)
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        emitter.execution_completed(result.is_ok(), duration_ms);

        result.map(|()| context)
    }

    /// Execute one node and recurse into its successors. Boxed future
    /// to support recursion.
    fn execute_node<'a>(
        &'a self,
        execution: &'a Execution,
        node: &'a Node,
        definition: &'a FlowDefinition,
        resolver: SuccessorResolver,
        context: &'a mut ExecutionContext,
        order: &'a mut u32,
        emitter: &'a EventEmitter,
    ) -> BoxFuture<'a, Result<(), FlowError>> {
        Box::pin(async move {
            let step = self
                .tracker
                .open_step(execution, node, *order, context)
                .await?;
            *order += 1;
            emitter.step_started(&step);

            match self.run_node_work(node, context, &step).await {
                Ok(output) => {
                    let step = self.tracker.close_completed(step, output.clone()).await?;
                    emitter.step_completed(&step);
                    tracing::debug!(
                        "Node '{}' completed in {}ms",
                        node.id,
                        step.duration_ms.unwrap_or(0)
                    );

                    context.merge(output);

                    if node.node_type.is_terminal() {
                        return Ok(());
                    }

                    // Depth-first, sequential: a successor's whole
                    // sub-traversal completes before the next sibling.
                    // Zero successors on a non-terminal node ends the
                    // branch silently.
                    for successor in resolver.successors(node, definition) {
                        self.execute_node(
                            execution, successor, definition, resolver, context, order, emitter,
                        )
                        .await?;
                    }
                    Ok(())
                }
                Err(err) => {
                    // Close-on-error: the failed step is persisted
                    // before the failure propagates, so the trace is
                    // never left RUNNING.
                    match self.tracker.close_failed(step, &err.to_string()).await {
                        Ok(step) => emitter.step_failed(&step),
                        Err(repo_err) => {
                            tracing::error!(
                                "Could not persist failed step for node '{}': {}",
                                node.id,
                                repo_err
                            );
                        }
                    }
                    tracing::error!("Node '{}' failed: {}", node.id, err);
                    Err(FlowError::NodeExecutionFailed {
                        node_id: node.id.clone(),
                        source: err,
                    })
                }
            }
        })
    }

    /// Run a single node's work: adapter-bearing nodes dispatch through
    /// the registry, everything else through the generic node handler.
    async fn run_node_work(
        &self,
        node: &Node,
        context: &ExecutionContext,
        step: &ExecutionStep,
    ) -> Result<ContextData, NodeError> {
        if node.is_adapter() {
            let descriptor = AdapterDescriptor::from_node(node)?;
            let executor = self.registry.resolve(&descriptor)?;
            executor.validate_configuration(&descriptor)?;
            Ok(executor.execute(&descriptor, context, step).await?)
        } else {
            self.handler.execute_node(step, node, context).await
        }
    }
}

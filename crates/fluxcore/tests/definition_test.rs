use fluxcore::{
    DefinitionError, Direction, Execution, ExecutionContext, FlowDefinition, Node, NodeType,
    StepStatus, StepType, Value,
};
use std::collections::HashMap;
use uuid::Uuid;

#[test]
fn deserializes_camel_case_definition() {
    let definition: FlowDefinition = serde_json::from_value(serde_json::json!({
        "id": Uuid::new_v4(),
        "name": "order-sync",
        "description": "Moves orders between systems",
        "nodes": [
            {"id": "start", "type": "start", "name": "Start"},
            {
                "id": "pull",
                "type": "adapter",
                "adapterId": "sftp-orders",
                "adapterType": "sftp",
                "direction": "inbound"
            },
            {"id": "split", "type": "parallelSplit"},
            {"id": "finish", "type": "messageEnd"}
        ],
        "edges": [
            {"source": "start", "target": "pull"},
            {"source": "pull", "target": "split"},
            {"source": "split", "target": "finish"}
        ]
    }))
    .unwrap();

    assert_eq!(definition.nodes.len(), 4);
    assert_eq!(definition.edges.len(), 3);

    let pull = definition.find_node_by_id("pull").unwrap();
    assert_eq!(pull.node_type, NodeType::Adapter);
    assert_eq!(pull.adapter_id.as_deref(), Some("sftp-orders"));
    // `inbound` is the legacy spelling of `source`.
    assert_eq!(pull.direction, Some(Direction::Source));
    assert!(pull.is_adapter());

    let split = definition.find_node_by_id("split").unwrap();
    assert_eq!(split.node_type, NodeType::ParallelSplit);

    let finish = definition.find_node_by_id("finish").unwrap();
    assert!(finish.node_type.is_terminal());
}

#[test]
fn unknown_node_types_deserialize_without_failing() {
    let node: Node = serde_json::from_value(serde_json::json!({
        "id": "mystery",
        "type": "somethingNew"
    }))
    .unwrap();

    assert_eq!(node.node_type, NodeType::Unknown);
    assert_eq!(StepType::for_node_type(node.node_type), StepType::Utility);
}

#[test]
fn find_node_by_type_returns_first_match() {
    let mut definition = FlowDefinition::new("lookup");
    definition.add_node(Node::new("one", NodeType::Utility));
    definition.add_node(Node::new("two", NodeType::Utility));

    assert_eq!(
        definition.find_node_by_type(NodeType::Utility).map(|n| n.id.as_str()),
        Some("one")
    );
    assert!(definition.find_node_by_type(NodeType::Start).is_none());
    assert!(definition.find_node_by_id("missing").is_none());
}

#[test]
fn step_type_mapping_table() {
    assert_eq!(StepType::for_node_type(NodeType::Start), StepType::AdapterSender);
    assert_eq!(StepType::for_node_type(NodeType::Adapter), StepType::AdapterSender);
    assert_eq!(StepType::for_node_type(NodeType::Sender), StepType::AdapterSender);
    assert_eq!(StepType::for_node_type(NodeType::End), StepType::AdapterReceiver);
    assert_eq!(StepType::for_node_type(NodeType::MessageEnd), StepType::AdapterReceiver);
    assert_eq!(StepType::for_node_type(NodeType::Receiver), StepType::AdapterReceiver);
    assert_eq!(StepType::for_node_type(NodeType::Utility), StepType::Utility);
    assert_eq!(StepType::for_node_type(NodeType::Condition), StepType::Decision);
    assert_eq!(StepType::for_node_type(NodeType::Decision), StepType::Decision);
    assert_eq!(StepType::for_node_type(NodeType::Parallel), StepType::Split);
    assert_eq!(StepType::for_node_type(NodeType::ParallelSplit), StepType::Split);
    assert_eq!(StepType::for_node_type(NodeType::Wait), StepType::Wait);
    assert_eq!(StepType::for_node_type(NodeType::Notification), StepType::Notification);
    assert_eq!(StepType::for_node_type(NodeType::Unknown), StepType::Utility);
}

#[test]
fn status_and_step_type_wire_names() {
    assert_eq!(
        serde_json::to_value(StepType::AdapterSender).unwrap(),
        serde_json::json!("ADAPTER_SENDER")
    );
    assert_eq!(
        serde_json::to_value(StepStatus::Running).unwrap(),
        serde_json::json!("RUNNING")
    );
}

#[test]
fn validate_accepts_a_well_formed_definition() {
    let mut definition = FlowDefinition::new("ok");
    definition.add_node(Node::new("start", NodeType::Start));
    definition.add_node(Node::new("end", NodeType::End));
    definition.connect("start", "end");

    assert!(definition.validate().is_ok());
}

#[test]
fn validate_rejects_structural_problems() {
    let empty = FlowDefinition::new("empty");
    assert_eq!(empty.validate(), Err(DefinitionError::EmptyNodeList));

    let mut no_start = FlowDefinition::new("no-start");
    no_start.add_node(Node::new("a", NodeType::Utility));
    assert_eq!(no_start.validate(), Err(DefinitionError::MissingStartNode));

    let mut two_starts = FlowDefinition::new("two-starts");
    two_starts.add_node(Node::new("s1", NodeType::Start));
    two_starts.add_node(Node::new("s2", NodeType::Start));
    assert_eq!(
        two_starts.validate(),
        Err(DefinitionError::MultipleStartNodes(2))
    );

    let mut duplicate = FlowDefinition::new("duplicate");
    duplicate.add_node(Node::new("start", NodeType::Start));
    duplicate.add_node(Node::new("start", NodeType::Utility));
    assert_eq!(
        duplicate.validate(),
        Err(DefinitionError::DuplicateNodeId("start".to_string()))
    );

    let mut dangling = FlowDefinition::new("dangling");
    dangling.add_node(Node::new("start", NodeType::Start));
    dangling.connect("start", "ghost");
    assert_eq!(
        dangling.validate(),
        Err(DefinitionError::UnknownEdgeEndpoint("ghost".to_string()))
    );
}

#[test]
fn validate_rejects_cycles_in_edges() {
    let mut definition = FlowDefinition::new("cycle");
    definition.add_node(Node::new("start", NodeType::Start));
    definition.add_node(Node::new("a", NodeType::Utility));
    definition.add_node(Node::new("b", NodeType::Utility));
    definition.connect("start", "a");
    definition.connect("a", "b");
    definition.connect("b", "a");

    assert_eq!(definition.validate(), Err(DefinitionError::CyclicDefinition));
}

#[test]
fn validate_rejects_cycles_in_parent_links() {
    let mut definition = FlowDefinition::new("parent-cycle");
    definition.add_node(Node::new("start", NodeType::Start));
    definition.add_node(Node::new("a", NodeType::Utility).with_parent("b"));
    definition.add_node(Node::new("b", NodeType::Utility).with_parent("a"));

    assert_eq!(definition.validate(), Err(DefinitionError::CyclicDefinition));
}

#[test]
fn context_seed_and_merge_preserve_insertion_order() {
    let execution = Execution::new(Uuid::new_v4())
        .with_payload(HashMap::from([("order".to_string(), Value::from("A-1"))]))
        .with_triggered_by("webhook");

    let mut context = ExecutionContext::seed(&execution);
    assert_eq!(context.get("order"), Some(&Value::from("A-1")));
    assert!(context.contains_key("executionId"));
    assert_eq!(context.get("triggeredBy"), Some(&Value::from("webhook")));

    let mut output = fluxcore::ContextData::new();
    output.insert("order".to_string(), Value::from("A-2"));
    output.insert("extra".to_string(), Value::from(true));
    let before = context.len();
    context.merge(output);

    // Overwrite keeps the key, merge only ever adds.
    assert_eq!(context.len(), before + 1);
    assert_eq!(context.get("order"), Some(&Value::from("A-2")));
    // The overwritten key keeps its original position.
    let keys: Vec<&str> = context.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys[0], "order");
    assert_eq!(keys.last().copied(), Some("extra"));
}

#[test]
fn value_accessors() {
    assert_eq!(Value::from("hi").as_str(), Some("hi"));
    assert_eq!(Value::from(2.5f64).as_f64(), Some(2.5));
    assert_eq!(Value::from(7i64).as_u64(), Some(7));
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert!(Value::Null.is_null());
    assert_eq!(Value::from("hi").as_f64(), None);
}

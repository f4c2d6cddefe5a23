use crate::{DefinitionError, Value};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

pub type FlowId = Uuid;

/// Declarative flow definition: a directed graph of typed nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    pub id: FlowId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    /// Optional; an empty edge list means successors are resolved
    /// through parent links instead.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> String {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    pub fn connect(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.edges.push(Edge {
            source: source.into(),
            target: target.into(),
        });
    }

    /// First node with the given type, if any. Definitions are tens of
    /// nodes, so a linear scan is fine.
    pub fn find_node_by_type(&self, node_type: NodeType) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_type == node_type)
    }

    pub fn find_node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Structural validation for front-ends: exactly one start node,
    /// unique ids, resolvable edge endpoints, no cycles. The engine
    /// itself only requires a node list and a start node.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.nodes.is_empty() {
            return Err(DefinitionError::EmptyNodeList);
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(DefinitionError::DuplicateNodeId(node.id.clone()));
            }
        }

        let starts = self
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Start)
            .count();
        match starts {
            0 => return Err(DefinitionError::MissingStartNode),
            1 => {}
            n => return Err(DefinitionError::MultipleStartNodes(n)),
        }

        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if self.find_node_by_id(endpoint).is_none() {
                    return Err(DefinitionError::UnknownEdgeEndpoint(endpoint.clone()));
                }
            }
        }

        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), DefinitionError> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut indices = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.id.as_str());
            indices.insert(node.id.as_str(), idx);
        }

        if self.edges.is_empty() {
            for node in &self.nodes {
                if let Some(parent) = node.parent_id.as_deref() {
                    if let (Some(&from), Some(&to)) =
                        (indices.get(parent), indices.get(node.id.as_str()))
                    {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        } else {
            for edge in &self.edges {
                if let (Some(&from), Some(&to)) = (
                    indices.get(edge.source.as_str()),
                    indices.get(edge.target.as_str()),
                ) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        if toposort(&graph, None).is_err() {
            return Err(DefinitionError::CyclicDefinition);
        }

        Ok(())
    }
}

/// A unit of work in a flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub name: Option<String>,
    /// Fallback successor link, used only when the definition carries
    /// no edges.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub adapter_id: Option<String>,
    #[serde(default)]
    pub adapter_type: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub config: HashMap<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: None,
            parent_id: None,
            adapter_id: None,
            adapter_type: None,
            direction: None,
            config: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_adapter(
        mut self,
        adapter_id: impl Into<String>,
        adapter_type: impl Into<String>,
        direction: Direction,
    ) -> Self {
        self.adapter_id = Some(adapter_id.into());
        self.adapter_type = Some(adapter_type.into());
        self.direction = Some(direction);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Adapter-bearing nodes dispatch through the adapter registry;
    /// everything else goes to the generic node handler.
    pub fn is_adapter(&self) -> bool {
        self.node_type == NodeType::Adapter || self.adapter_id.is_some()
    }
}

/// Directed connection between two nodes. Duplicates are allowed;
/// multiple edges may share a source (fan-out) or a target (fan-in).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// Node types understood by the engine. Unrecognized strings
/// deserialize to `Unknown` and are executed as utility steps rather
/// than failing the flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Start,
    Adapter,
    Sender,
    Receiver,
    End,
    MessageEnd,
    Utility,
    Condition,
    Decision,
    Parallel,
    ParallelSplit,
    Wait,
    Notification,
    #[serde(other)]
    Unknown,
}

impl NodeType {
    /// Terminal node types end their branch of the traversal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeType::End | NodeType::MessageEnd)
    }
}

/// Data direction of an adapter node. Definitions produced by older
/// tooling say `inbound`/`outbound`; both vocabularies are accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "inbound")]
    Source,
    #[serde(alias = "outbound")]
    Target,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Source => write!(f, "source"),
            Direction::Target => write!(f, "target"),
        }
    }
}

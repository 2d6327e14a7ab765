//! Problem instances: arrays, graphs/trees and DP tables.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Identity of an array element. Stable across reorderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Identity of a graph, tree or list node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identity of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

/// Semantic colors. The front-end owns the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Untouched node or bar.
    #[default]
    Default,
    /// Being compared.
    Comparing,
    /// Being swapped or moved.
    Swapping,
    /// In final position.
    Sorted,
    /// Currently explored.
    Active,
    /// Done.
    Visited,
    /// Discovered, waiting in a queue.
    Queued,
    /// Edge under consideration.
    Considering,
    /// Part of the reported path.
    Path,
    /// Source node.
    Start,
    /// Destination node.
    End,
    /// Search hit.
    Found,
    /// Plain edge.
    Idle,
    /// Secondary edge (e.g. back link of a doubly linked list).
    Muted,
}

/// Element of the array variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub value: i64,
}

impl Element {
    pub fn new(id: u64, value: i64) -> Self {
        Self {
            id: ElementId(id),
            value,
        }
    }
}

/// Scene position, recomputed by layout code, never by algorithm logic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Node of the graph/tree variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub value: i64,
    pub position: Position,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Node {
    pub fn new(id: NodeId, value: i64, position: Position) -> Self {
        Self {
            id,
            value,
            position,
            color: Color::Default,
            left: None,
            right: None,
            height: None,
        }
    }
}

/// Edge of the graph/tree variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            color: Color::Idle,
            weight: None,
        }
    }

    pub fn weighted(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// The endpoint opposite `node`, if this edge touches it.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Graph, tree or linked-list instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub root: Option<NodeId>,
}

impl Graph {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    /// Edges whose endpoints both exist. Anything else is "not yet rendered".
    pub fn renderable_edges(&self) -> impl Iterator<Item = &Edge> {
        let ids: HashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.edges
            .iter()
            .filter(move |e| ids.contains(&e.source) && ids.contains(&e.target))
    }

    /// Undirected neighbours of `node` in edge order, skipping dangling edges.
    pub fn neighbors(&self, node: NodeId) -> Vec<(&Edge, NodeId)> {
        self.renderable_edges()
            .filter_map(|e| e.other(node).map(|other| (e, other)))
            .collect()
    }

    /// A node id not used by this graph.
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0))
    }
}

/// One knapsack item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub weight: usize,
    pub value: i64,
}

/// The problem a DP table is solving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DpProblem {
    Fibonacci { n: usize },
    Knapsack { capacity: usize, items: Vec<Item> },
}

/// A tabulation grid. `None` cells are not computed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpTable {
    pub problem: DpProblem,
    pub cells: Vec<Vec<Option<i64>>>,
}

impl DpTable {
    /// Empty 1×n Fibonacci table.
    pub fn fibonacci(n: usize) -> Self {
        Self {
            problem: DpProblem::Fibonacci { n },
            cells: vec![vec![None; n]],
        }
    }

    /// Knapsack table with row 0 and column 0 pre-filled with zeroes.
    pub fn knapsack(capacity: usize, items: Vec<Item>) -> Self {
        let rows = items.len() + 1;
        let mut cells = vec![vec![None; capacity + 1]; rows];
        for (r, row) in cells.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                if r == 0 || c == 0 {
                    *cell = Some(0);
                }
            }
        }
        Self {
            problem: DpProblem::Knapsack { capacity, items },
            cells,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// The current problem, polymorphic over its shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "variant", content = "data", rename_all = "snake_case")]
pub enum ProblemInstance {
    #[default]
    Empty,
    Array(Vec<Element>),
    Graph(Graph),
    Table(DpTable),
}

impl ProblemInstance {
    pub fn as_array(&self) -> Option<&[Element]> {
        match self {
            ProblemInstance::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_graph(&self) -> Option<&Graph> {
        match self {
            ProblemInstance::Graph(graph) => Some(graph),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&DpTable> {
        match self {
            ProblemInstance::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Number of elements, nodes or cells.
    pub fn len(&self) -> usize {
        match self {
            ProblemInstance::Empty => 0,
            ProblemInstance::Array(items) => items.len(),
            ProblemInstance::Graph(graph) => graph.nodes.len(),
            ProblemInstance::Table(table) => table.cells.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A generated instance plus what the run is looking for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub instance: ProblemInstance,
    pub target: Option<i64>,
    pub description: Option<String>,
}

impl Scenario {
    pub fn new(instance: ProblemInstance) -> Self {
        Self {
            instance,
            target: None,
            description: None,
        }
    }

    pub fn with_target(mut self, target: i64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

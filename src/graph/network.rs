//! Graph: the undirected, coordinate-keyed network

use super::edge::{Edge, EdgeKey};
use super::node::{Coordinate, Node};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// Errors from graph-level operations
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("graph has no nodes")]
    EmptyGraph,
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// An undirected graph whose nodes are identified by coordinates.
///
/// Nodes and edges keep insertion order, which every derived view
/// (components, writers) inherits so that runs are reproducible.
///
/// Invariants:
/// - every edge's endpoints are present as nodes
/// - at most one edge per unordered endpoint pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: IndexMap<Coordinate, Node>,
    edges: IndexMap<EdgeKey, Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `coordinate`.
    ///
    /// Returns `false` when the node already existed; the existing node is
    /// left untouched.
    pub fn add_node(&mut self, coordinate: Coordinate) -> bool {
        self.insert_node(Node::new(coordinate))
    }

    /// Add a node with its payload. An existing node at the same coordinate
    /// is kept, but gains the external id if it had none.
    pub fn insert_node(&mut self, node: Node) -> bool {
        match self.nodes.get_mut(&node.coordinate) {
            Some(existing) => {
                if existing.external_id.is_none() {
                    existing.external_id = node.external_id;
                }
                false
            }
            None => {
                self.nodes.insert(node.coordinate, node);
                true
            }
        }
    }

    /// Add an edge, creating missing endpoint nodes.
    ///
    /// Re-adding an existing unordered pair replaces its annotation (last
    /// write wins) while keeping the edge's original position. Returns the
    /// replaced edge, if any.
    pub fn add_edge(&mut self, edge: Edge) -> Option<Edge> {
        self.add_node(edge.from);
        self.add_node(edge.to);
        self.edges.insert(edge.key(), edge)
    }

    pub fn get_node(&self, coordinate: &Coordinate) -> Option<&Node> {
        self.nodes.get(coordinate)
    }

    pub fn contains_node(&self, coordinate: &Coordinate) -> bool {
        self.nodes.contains_key(coordinate)
    }

    /// Look up the edge between `a` and `b`, in either direction
    pub fn get_edge(&self, a: Coordinate, b: Coordinate) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    /// Get all nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node coordinates, in insertion order
    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> {
        self.nodes.keys()
    }

    /// Get all edges, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes with no incident edge, in insertion order
    pub fn isolated_nodes(&self) -> impl Iterator<Item = &Node> {
        let touched: IndexSet<Coordinate> = self
            .edges
            .keys()
            .flat_map(|k| {
                let (a, b) = k.endpoints();
                [a, b]
            })
            .collect();
        self.nodes
            .values()
            .filter(move |n| !touched.contains(&n.coordinate))
    }
}

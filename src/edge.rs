use std::fmt::{Debug, Display};

use crate::node::Node;

/// Weight of an edge record. Only Bellman-Ford tolerates negative values.
pub type Weight = f64;

/// We limit the number of edge records to `2^32 - 1`.
pub type NumEdges = u32;

/// Identifier shared by all records of one logical route
pub type RouteId = NumEdges;

/// An edge is defined by two nodes/endpoints.
/// It is used for logical routes (e.g. the pair returned when a route is destroyed)
/// and for the edges of a spanning tree.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(pub Node, pub Node);

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

impl Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

impl Edge {
    /// Normalizes the edge such that the endpoint with smaller value comes first
    pub fn normalized(&self) -> Self {
        Edge(self.0.min(self.1), self.0.max(self.1))
    }

    /// Returns true if both endpoints are equal
    pub fn is_loop(&self) -> bool {
        self.0 == self.1
    }

    /// Reverses the edge by switching the endpoints
    pub fn reverse(&self) -> Self {
        Edge(self.1, self.0)
    }
}

impl From<(Node, Node)> for Edge {
    fn from(value: (Node, Node)) -> Self {
        Edge(value.0, value.1)
    }
}

impl From<&EdgeRecord> for Edge {
    fn from(value: &EdgeRecord) -> Self {
        value.endpoints()
    }
}

/// One directed adjacency record as stored in the graph.
///
/// Undirected routes own two records with swapped endpoints, `directed == false` and
/// the same `route`. Records are never removed; a fault only clears `active`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    /// Tail of the record
    pub from: Node,
    /// Head of the record
    pub to: Node,
    /// Traversal cost
    pub weight: Weight,
    /// Whether the record can currently be traversed
    pub active: bool,
    /// `false` if this record is one half of an undirected route
    pub directed: bool,
    /// Route this record belongs to
    pub route: RouteId,
}

impl EdgeRecord {
    /// Returns the endpoints `(from, to)` of the record
    pub fn endpoints(&self) -> Edge {
        Edge(self.from, self.to)
    }
}

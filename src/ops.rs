use std::{ops::Range, rc::Rc};

use crate::{edge::*, node::*, repr::Neighbors};

/// Provides getters pertaining to the node-size of a graph
pub trait GraphNodeOrder {
    /// Returns the number of nodes of the graph
    fn number_of_nodes(&self) -> NumNodes;

    /// Return the number of nodes as usize
    fn len(&self) -> usize {
        self.number_of_nodes() as usize
    }

    /// Returns *true* if the graph has no nodes (and thus no edges)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the nodes of the graph in registration order.
    /// The range does not borrow `self`.
    fn vertices_range(&self) -> Range<Node> {
        0..self.number_of_nodes()
    }

    /// Returns empty bitset with one entry per node
    fn vertex_bitset_unset(&self) -> NodeBitSet {
        NodeBitSet::new(self.number_of_nodes())
    }
}

/// Provides getters pertaining to the edge-size of a graph
pub trait GraphEdgeOrder {
    /// Returns the number of edge records of the graph (active or not)
    fn number_of_edges(&self) -> NumEdges;

    /// Returns *true* if the graph has no edge records
    fn is_singleton(&self) -> bool {
        self.number_of_edges() == 0
    }
}

/// Read access to weighted, (de)activatable adjacency lists.
///
/// This is the only view the stepwise algorithms have on a graph. It is implemented by
/// [`Graph`](crate::repr::Graph) and forwarded through `&G` and `Rc<G>`, so an algorithm
/// can either borrow a graph or share ownership of it.
pub trait WeightedAdjacencyList: GraphNodeOrder {
    /// Returns all records leaving `u` (including inactive ones) in insertion order.
    /// ** Panics if `u >= n` **
    fn out_records(&self, u: Node) -> &[EdgeRecord];

    /// Returns an iterator over `(v, weight)` of every *active* record leaving `u`
    /// in insertion order. The iterator is cheap to clone and can thus be restarted.
    /// ** Panics if `u >= n` **
    fn neighbors_of(&self, u: Node) -> Neighbors<'_> {
        Neighbors::new(self.out_records(u))
    }

    /// Resumable neighbor scan: returns the next active `(v, weight)` of `u` at or after
    /// position `*cursor` of its records, and moves `*cursor` past it.
    ///
    /// Algorithms that suspend in the middle of a neighborhood only need to remember
    /// `(u, cursor)` instead of a borrowing iterator.
    fn next_neighbor_of(&self, u: Node, cursor: &mut usize) -> Option<(Node, Weight)> {
        let records = self.out_records(u);
        while let Some(record) = records.get(*cursor) {
            *cursor += 1;
            if record.active {
                return Some((record.to, record.weight));
            }
        }
        None
    }

    /// Returns an iterator over every record (active or not), ordered by tail node and then
    /// insertion order.
    fn edge_records(&self) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.vertices_range()
            .flat_map(move |u| self.out_records(u).iter())
    }

    /// Returns the number of active records leaving `u`
    /// ** Panics if `u >= n` **
    fn active_degree_of(&self, u: Node) -> NumNodes {
        self.neighbors_of(u).count() as NumNodes
    }

    /// Returns the number of active records
    fn number_of_active_edges(&self) -> NumEdges {
        self.edge_records().filter(|record| record.active).count() as NumEdges
    }
}

impl<G: GraphNodeOrder> GraphNodeOrder for &G {
    fn number_of_nodes(&self) -> NumNodes {
        (**self).number_of_nodes()
    }
}

impl<G: WeightedAdjacencyList> WeightedAdjacencyList for &G {
    fn out_records(&self, u: Node) -> &[EdgeRecord] {
        (**self).out_records(u)
    }
}

impl<G: GraphNodeOrder> GraphNodeOrder for Rc<G> {
    fn number_of_nodes(&self) -> NumNodes {
        (**self).number_of_nodes()
    }
}

impl<G: WeightedAdjacencyList> WeightedAdjacencyList for Rc<G> {
    fn out_records(&self, u: Node) -> &[EdgeRecord] {
        (**self).out_records(u)
    }
}

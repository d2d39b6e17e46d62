use std::{collections::VecDeque, iter::FusedIterator};

use rand::Rng;
use tracing::debug;

use super::*;

/// Connected components of the active subgraph.
///
/// Components are computed on the *undirected view* of the graph: an active record
/// `u -> v` connects `u` and `v` regardless of its direction. For graphs made of
/// undirected routes only, this coincides with mutual reachability.
pub trait Connectivity: WeightedAdjacencyList + Sized {
    /// Returns an iterator over the components. Seeds are taken in registration order and
    /// each component lists its nodes in breadth-first order from its seed.
    fn connected_components(&self) -> ConnectedComponents<'_, Self> {
        ConnectedComponents::new(self)
    }

    /// Returns the number of connected components (`0` for the empty graph)
    fn number_of_components(&self) -> NumNodes {
        self.connected_components().count() as NumNodes
    }

    /// Returns *true* if the active subgraph has at most one component
    fn is_connected(&self) -> bool {
        self.connected_components().nth(1).is_none()
    }
}

impl<G: WeightedAdjacencyList> Connectivity for G {}

/// Iterator over the connected components of a graph, see [`Connectivity`]
pub struct ConnectedComponents<'a, G> {
    graph: &'a G,
    /// Heads of active records entering each node
    incoming: Vec<Vec<Node>>,
    visited: NodeBitSet,
    next_seed: Node,
    queue: VecDeque<Node>,
}

impl<'a, G: WeightedAdjacencyList> ConnectedComponents<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        let mut incoming = vec![Vec::new(); graph.len()];
        for record in graph.edge_records().filter(|record| record.active) {
            incoming[record.to as usize].push(record.from);
        }

        Self {
            graph,
            incoming,
            visited: graph.vertex_bitset_unset(),
            next_seed: 0,
            queue: VecDeque::new(),
        }
    }
}

impl<G: WeightedAdjacencyList> Iterator for ConnectedComponents<'_, G> {
    type Item = Vec<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.graph.number_of_nodes();
        while self.next_seed < n && self.visited.get_bit(self.next_seed) {
            self.next_seed += 1;
        }
        if self.next_seed >= n {
            return None;
        }

        let seed = self.next_seed;
        self.visited.set_bit(seed);
        self.queue.push_back(seed);

        let mut component = Vec::new();
        while let Some(u) = self.queue.pop_front() {
            component.push(u);

            let outgoing = self.graph.neighbors_of(u).map(|(v, _)| v);
            for v in outgoing.chain(self.incoming[u as usize].iter().copied()) {
                if !self.visited.set_bit(v) {
                    self.queue.push_back(v);
                }
            }
        }

        Some(component)
    }
}

impl<G: WeightedAdjacencyList> FusedIterator for ConnectedComponents<'_, G> {}

/// Effect of destroying one route on the connectivity of a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragmentation {
    /// Endpoints of the destroyed record
    pub route: Edge,
    /// Number of components before the route was destroyed
    pub components_before: NumNodes,
    /// Components after the route was destroyed
    pub components: Vec<Vec<Node>>,
}

impl Fragmentation {
    /// Returns *true* if destroying the route split a component
    pub fn is_fragmented(&self) -> bool {
        self.components.len() as NumNodes > self.components_before
    }
}

impl Graph {
    /// Destroys a random active route (see [`Graph::deactivate_random_edge`]) and reports
    /// whether the network got fragmented. Returns `None` if no route is active.
    pub fn remove_random_route<R>(&mut self, rng: &mut R) -> Option<Fragmentation>
    where
        R: Rng + ?Sized,
    {
        let components_before = self.number_of_components();
        let route = self.deactivate_random_edge(rng)?;
        Some(self.report_fragmentation(route, components_before))
    }

    /// Destroys the active route `u -> v` (see [`Graph::deactivate_edge`]) and reports
    /// whether the network got fragmented. Returns `None` if there is no such route.
    pub fn remove_route(&mut self, u: Node, v: Node) -> Option<Fragmentation> {
        let components_before = self.number_of_components();
        let route = self.deactivate_edge(u, v)?;
        Some(self.report_fragmentation(route, components_before))
    }

    fn report_fragmentation(&self, route: Edge, components_before: NumNodes) -> Fragmentation {
        let report = Fragmentation {
            route,
            components_before,
            components: self.connected_components().collect(),
        };

        if report.is_fragmented() {
            debug!(
                from = %self.name_of(route.0),
                to = %self.name_of(route.1),
                components = report.components.len(),
                "network fragmented"
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{diamond, random_graph};
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn sorted(components: impl Iterator<Item = Vec<Node>>) -> Vec<Vec<Node>> {
        components
            .map(|mut cc| {
                cc.sort_unstable();
                cc
            })
            .collect()
    }

    #[test]
    fn diamond_is_connected() {
        let graph = diamond();
        assert_eq!(graph.connected_components().collect_vec(), vec![vec![0, 1, 2, 3]]);
        assert!(graph.is_connected());
        assert_eq!(graph.number_of_components(), 1);
    }

    #[test]
    fn isolated_nodes_and_empty_graph() {
        let graph = Graph::from_edges(4, [(2, 1, 1.0)], true);
        assert_eq!(
            graph.connected_components().collect_vec(),
            vec![vec![0], vec![1, 2], vec![3]]
        );

        assert_eq!(Graph::new().number_of_components(), 0);
        assert!(Graph::new().is_connected());
    }

    #[test]
    fn direction_is_ignored() {
        let graph = Graph::from_edges(4, [(1, 0, 1.0), (1, 2, 1.0), (3, 2, 1.0)], false);
        assert_eq!(sorted(graph.connected_components()), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn bridge_removal_fragments() {
        let mut graph = diamond();

        let report = graph.remove_route(1, 2).unwrap();
        assert_eq!(report.route, Edge(1, 2));
        assert!(!report.is_fragmented());

        let report = graph.remove_route(3, 2).unwrap();
        assert!(report.is_fragmented());
        assert_eq!(report.components_before, 1);
        assert_eq!(sorted(report.components.into_iter()), vec![vec![0, 1, 2], vec![3]]);

        assert_eq!(graph.remove_route(3, 2), None);
    }

    #[test]
    fn random_removals_end_with_singletons() {
        let rng = &mut Pcg64Mcg::seed_from_u64(17);
        let mut graph = random_graph(rng, 8, 16, true);
        let mut last = graph.number_of_components();

        while let Some(report) = graph.remove_random_route(rng) {
            assert_eq!(report.components_before, last);
            assert!(report.components.len() as NumNodes >= last);
            assert!(report.components.len() as NumNodes <= last + 1);
            assert_eq!(report.components.iter().map(Vec::len).sum::<usize>(), 8);
            last = report.components.len() as NumNodes;
        }

        assert_eq!(graph.number_of_components(), 8);
    }

    #[test]
    fn components_partition_the_nodes() {
        let rng = &mut Pcg64Mcg::seed_from_u64(19);

        for _ in 0..30 {
            let graph = random_graph(rng, 15, 12, false);
            let components = graph.connected_components().collect_vec();

            let mut all = components.iter().flatten().copied().collect_vec();
            all.sort_unstable();
            assert_eq!(all, (0..15).collect_vec());

            let seeds = components.iter().map(|cc| cc[0]).collect_vec();
            assert!(seeds.iter().tuple_windows().all(|(a, b)| a < b));

            for record in graph.edge_records() {
                let same = components
                    .iter()
                    .any(|cc| cc.contains(&record.from) && cc.contains(&record.to));
                assert!(same);
            }
        }
    }
}

use fxhash::FxHashSet;

use super::*;

/// Bridges of the undirected view of the active subgraph: routes whose destruction
/// increases the number of connected components.
pub trait Bridges: WeightedAdjacencyList + Sized {
    /// Returns one `Edge(parent, child)` per bridge, oriented along the DFS tree.
    /// Parallel routes between the same endpoints are never bridges.
    fn compute_bridges(&self) -> Vec<Edge>;
}

impl<G> Bridges for G
where
    G: WeightedAdjacencyList,
{
    fn compute_bridges(&self) -> Vec<Edge> {
        BridgeSearch::new(self).compute()
    }
}

struct BridgeSearch {
    /// Undirected view: `(neighbor, route)` per active route, both directions
    adjacency: Vec<Vec<(Node, RouteId)>>,
    visited: NodeBitSet,
    nodes_info: Vec<NodeInfo>,
    time: Node,
    bridges: Vec<Edge>,
}

impl BridgeSearch {
    fn new<G: WeightedAdjacencyList>(graph: &G) -> Self {
        let n = graph.len();
        let mut adjacency = vec![Vec::new(); n];
        let mut seen = FxHashSet::default();

        for record in graph.edge_records().filter(|record| record.active) {
            if record.from == record.to || !seen.insert(record.route) {
                continue;
            }
            adjacency[record.from as usize].push((record.to, record.route));
            adjacency[record.to as usize].push((record.from, record.route));
        }

        Self {
            adjacency,
            visited: graph.vertex_bitset_unset(),
            nodes_info: vec![NodeInfo::default(); n],
            time: 0,
            bridges: Vec::new(),
        }
    }

    fn compute(mut self) -> Vec<Edge> {
        for u in 0..self.adjacency.len() as Node {
            if self.visited.set_bit(u) {
                continue;
            }

            self.compute_node(None, u);
        }

        self.bridges
    }

    fn compute_node(&mut self, parent_route: Option<RouteId>, u: Node) -> NodeInfo {
        self.time += 1;

        self.nodes_info[u as usize] = NodeInfo {
            parent_route,
            discovery: self.time,
            low: self.time,
        };

        for i in 0..self.adjacency[u as usize].len() {
            let (v, route) = self.adjacency[u as usize][i];

            if !self.visited.set_bit(v) {
                let info_v = self.compute_node(Some(route), v);

                self.nodes_info[u as usize].update_low(info_v.low);

                if info_v.low > self.nodes_info[u as usize].discovery {
                    self.bridges.push(Edge(u, v));
                }
            } else if Some(route) != self.nodes_info[u as usize].parent_route {
                let v_disc = self.nodes_info[v as usize].discovery;
                self.nodes_info[u as usize].update_low(v_disc);
            }
        }

        self.nodes_info[u as usize]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeInfo {
    parent_route: Option<RouteId>,
    discovery: Node,
    low: Node,
}

impl NodeInfo {
    fn update_low(&mut self, low: Node) {
        self.low = self.low.min(low);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{diamond, random_graph};
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn normalized_bridges(graph: &Graph) -> Vec<Edge> {
        graph
            .compute_bridges()
            .into_iter()
            .map(|e| e.normalized())
            .sorted()
            .collect()
    }

    #[test]
    fn diamond_bridges() {
        let mut graph = diamond();
        assert_eq!(normalized_bridges(&graph), vec![Edge(2, 3)]);

        graph.deactivate_edge(0, 2);
        assert_eq!(
            normalized_bridges(&graph),
            vec![Edge(0, 1), Edge(1, 2), Edge(2, 3)]
        );
    }

    #[test]
    fn parallel_routes_are_no_bridges() {
        let graph = Graph::from_edges(3, [(0, 1, 1.0), (1, 0, 2.0), (1, 2, 1.0)], true);
        assert_eq!(normalized_bridges(&graph), vec![Edge(1, 2)]);
    }

    #[test]
    fn directed_records_count_as_connections() {
        let graph = Graph::from_edges(3, [(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0)], false);
        assert!(graph.compute_bridges().is_empty());

        let graph = Graph::from_edges(3, [(0, 1, 1.0), (2, 1, 1.0)], false);
        assert_eq!(normalized_bridges(&graph), vec![Edge(0, 1), Edge(1, 2)]);
    }

    #[test]
    fn bridges_are_exactly_the_fragmenting_routes() {
        let rng = &mut Pcg64Mcg::seed_from_u64(23);

        for _ in 0..20 {
            let graph = random_graph(rng, 9, 11, true);
            let bridges = normalized_bridges(&graph);

            for record in graph.edge_records().filter(|r| r.from < r.to) {
                let mut probe = graph.clone();
                let report = probe.remove_route(record.from, record.to).unwrap();

                assert_eq!(
                    report.is_fragmented(),
                    bridges.contains(&record.endpoints()),
                    "route {}",
                    record.endpoints()
                );
            }
        }
    }
}

use std::{collections::BinaryHeap, iter::FusedIterator};

use super::*;

/// Stepwise Dijkstra from `origin` to `destination` on non-negative weights.
///
/// Emits [`Notice::DijkstraStarted`], then per settled node `u` a [`Step::DijkstraVisit`]
/// followed by one [`Step::DijkstraRelax`] per improved neighbor. The search stops right
/// after visiting `destination` (or once no reachable node is left) and ends with
/// [`Outcome::ShortestPath`], whose path is empty and whose cost is infinite if
/// `destination` cannot be reached.
///
/// The frontier strategy is configured with [`DijkstraSteps::frontier`].
///
/// # Examples
/// ```
/// use stepgraphs::{prelude::*, algo::*};
///
/// let graph = Graph::from_edges(3, [(0, 1, 2.0), (1, 2, 2.0), (0, 2, 5.0)], true);
/// let outcome = DijkstraSteps::new(&graph, 0, 2)
///     .frontier(Frontier::LinearScan)
///     .run_to_end()
///     .unwrap();
///
/// assert_eq!(outcome.path(), &[0, 1, 2]);
/// assert_eq!(outcome.cost(), Some(4.0));
/// ```
pub struct DijkstraSteps<G> {
    graph: G,
    origin: Node,
    destination: Node,
    dist: Distances,
    prev: Predecessors,
    settled: NodeBitSet,
    heap: BinaryHeap<FrontierEntry>,
    frontier: Frontier,
    current: Option<(Node, usize)>,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Searching,
    Done,
    Finished,
}

impl<G: WeightedAdjacencyList> DijkstraSteps<G> {
    /// # Panics
    /// Panics if `origin >= n` or `destination >= n`.
    pub fn new(graph: G, origin: Node, destination: Node) -> Self {
        let n = graph.number_of_nodes();
        assert!(origin < n, "Origin {origin} is not a node of the graph");
        assert!(
            destination < n,
            "Destination {destination} is not a node of the graph"
        );

        let mut dist = vec![Weight::INFINITY; n as usize];
        dist[origin as usize] = 0.0;

        let mut heap = BinaryHeap::with_capacity(n as usize);
        heap.push(FrontierEntry {
            key: 0.0,
            node: origin,
            via: None,
        });

        Self {
            settled: graph.vertex_bitset_unset(),
            graph,
            origin,
            destination,
            dist,
            prev: vec![None; n as usize],
            heap,
            frontier: Frontier::default(),
            current: None,
            phase: Phase::Start,
        }
    }

    /// Selects how the next node to settle is found.
    /// May be called mid-run: pending nodes carry over to the new frontier.
    pub fn set_frontier(&mut self, frontier: Frontier) {
        if frontier == self.frontier {
            return;
        }

        // the linear scan reads `dist` directly; only the heap needs rebuilding
        self.heap = match frontier {
            Frontier::BinaryHeap => self
                .graph
                .vertices_range()
                .filter(|&u| !self.settled.get_bit(u) && self.dist[u as usize].is_finite())
                .map(|u| FrontierEntry {
                    key: self.dist[u as usize],
                    node: u,
                    via: None,
                })
                .collect(),
            Frontier::LinearScan => BinaryHeap::new(),
        };
        self.frontier = frontier;
    }

    /// Selects how the next node to settle is found
    pub fn frontier(mut self, frontier: Frontier) -> Self {
        self.set_frontier(frontier);
        self
    }

    /// Settles and returns the unsettled node with smallest finite distance, if any
    fn settle_next(&mut self) -> Option<Node> {
        let u = match self.frontier {
            Frontier::BinaryHeap => loop {
                let entry = self.heap.pop()?;
                if !self.settled.get_bit(entry.node) {
                    break entry.node;
                }
            },
            Frontier::LinearScan => {
                let mut best: Option<Node> = None;
                for u in self.graph.vertices_range() {
                    let d = self.dist[u as usize];
                    if self.settled.get_bit(u) || d == Weight::INFINITY {
                        continue;
                    }
                    if best.is_none_or(|b| d < self.dist[b as usize]) {
                        best = Some(u);
                    }
                }
                best?
            }
        };

        self.settled.set_bit(u);
        Some(u)
    }

    /// Relaxes the next improvable neighbor of the current node
    fn relax_next(&mut self) -> Option<Step> {
        let (u, cursor) = self.current.as_mut()?;
        let u = *u;

        while let Some((v, weight)) = self.graph.next_neighbor_of(u, cursor) {
            if self.settled.get_bit(v) {
                continue;
            }

            let alt = self.dist[u as usize] + weight;
            if alt < self.dist[v as usize] {
                self.dist[v as usize] = alt;
                self.prev[v as usize] = Some(u);
                if self.frontier == Frontier::BinaryHeap {
                    self.heap.push(FrontierEntry {
                        key: alt,
                        node: v,
                        via: None,
                    });
                }

                return Some(Step::DijkstraRelax {
                    from: u,
                    to: v,
                    dist: alt,
                    prev: self.prev.clone(),
                });
            }
        }

        self.current = None;
        None
    }
}

impl<G: WeightedAdjacencyList> Iterator for DijkstraSteps<G> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Searching;
                    return Some(Step::Notice(Notice::DijkstraStarted {
                        origin: self.origin,
                        destination: self.destination,
                    }));
                }
                Phase::Searching => {
                    if let Some(step) = self.relax_next() {
                        return Some(step);
                    }

                    let Some(u) = self.settle_next() else {
                        self.phase = Phase::Done;
                        continue;
                    };

                    if u == self.destination {
                        self.phase = Phase::Done;
                    } else {
                        self.current = Some((u, 0));
                    }

                    return Some(Step::DijkstraVisit {
                        node: u,
                        dist: self.dist.clone(),
                        prev: self.prev.clone(),
                    });
                }
                Phase::Done => {
                    self.phase = Phase::Finished;
                    let (path, cost) = reconstruct_path(&self.dist, &self.prev, self.destination);
                    return Some(Step::Finished(Outcome::ShortestPath { path, cost }));
                }
                Phase::Finished => return None,
            }
        }
    }
}

impl<G: WeightedAdjacencyList> FusedIterator for DijkstraSteps<G> {}

impl<G: WeightedAdjacencyList> StepSequence for DijkstraSteps<G> {
    fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

crate::testing::test_frontier_variants!(test_dijkstra, |frontier| {
    fn diamond_shortest_path() {
        let graph = diamond();
        let outcome = DijkstraSteps::new(&graph, 0, 3)
            .frontier(frontier)
            .run_to_end()
            .unwrap();

        assert_eq!(outcome.path(), &[0, 1, 2, 3]);
        assert_eq!(outcome.cost(), Some(4.0));
        assert_eq!(
            outcome.path().iter().map(|&u| graph.name_of(u)).collect_vec(),
            vec!["A", "B", "C", "D"]
        );
    }

    fn diamond_step_order() {
        let graph = diamond();
        let trace = DijkstraSteps::new(&graph, 0, 3)
            .frontier(frontier)
            .filter_map(|step| match step {
                Step::DijkstraVisit { node, .. } => Some(format!("visit {node}")),
                Step::DijkstraRelax { from, to, dist, .. } => {
                    Some(format!("{from}->{to}={dist}"))
                }
                _ => None,
            })
            .collect_vec();

        assert_eq!(
            trace,
            vec![
                "visit 0", "0->1=1", "0->2=4", "visit 1", "1->2=3", "visit 2", "2->3=4",
                "visit 3"
            ]
        );
    }

    fn unreachable_destination() {
        let graph = Graph::from_edges(3, [(0, 1, 1.0), (2, 1, 1.0)], false);
        let mut steps = DijkstraSteps::new(&graph, 0, 2).frontier(frontier);

        assert_eq!(
            steps.run_to_end(),
            Some(Outcome::ShortestPath {
                path: vec![],
                cost: Weight::INFINITY
            })
        );
        assert!(steps.is_finished());
    }

    fn origin_is_destination() {
        let graph = diamond();
        let steps = DijkstraSteps::new(&graph, 2, 2).frontier(frontier).collect_vec();

        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[1], Step::DijkstraVisit { node: 2, .. }));
        assert_eq!(steps[2].clone(), Step::Finished(Outcome::ShortestPath { path: vec![2], cost: 0.0 }));
    }

    fn deactivated_routes_are_avoided() {
        let mut graph = diamond();
        graph.deactivate_edge(1, 2);

        let outcome = graph.dijkstra_steps(0, 3).frontier(frontier).run_to_end().unwrap();
        assert_eq!(outcome.path(), &[0, 2, 3]);
        assert_eq!(outcome.cost(), Some(5.0));
    }

    fn switching_frontier_mid_run() {
        let graph = diamond();
        let other = match frontier {
            Frontier::BinaryHeap => Frontier::LinearScan,
            Frontier::LinearScan => Frontier::BinaryHeap,
        };
        let len = DijkstraSteps::new(&graph, 0, 3).frontier(frontier).count();

        for pulled in 0..len {
            let mut steps = DijkstraSteps::new(&graph, 0, 3).frontier(frontier);
            steps.by_ref().take(pulled).for_each(drop);
            steps.set_frontier(other);

            let outcome = steps.run_to_end().unwrap();
            assert_eq!(outcome.path(), &[0, 1, 2, 3], "switched after {pulled} steps");
            assert_eq!(outcome.cost(), Some(4.0));
        }
    }

    fn visits_are_monotone_and_never_relax_settled() {
        let rng = &mut rand_pcg::Pcg64Mcg::seed_from_u64(11);

        for _ in 0..30 {
            let graph = random_graph(rng, 10, 25, true);
            let mut settled = Vec::new();
            let mut last = 0.0;

            for step in DijkstraSteps::new(&graph, 0, 9).frontier(frontier) {
                match step {
                    Step::DijkstraVisit { node, dist, .. } => {
                        assert!(dist[node as usize] >= last);
                        last = dist[node as usize];
                        settled.push(node);
                    }
                    Step::DijkstraRelax { to, .. } => assert!(!settled.contains(&to)),
                    Step::Finished(Outcome::ShortestPath { path, cost }) => {
                        if cost.is_finite() {
                            assert_eq!(settled.last(), Some(&9));
                            assert_eq!(path.first(), Some(&0));
                            assert_eq!(path.last(), Some(&9));
                        } else {
                            assert!(path.is_empty());
                        }
                    }
                    _ => {}
                }
            }
        }
    }
});

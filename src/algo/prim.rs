use std::{collections::BinaryHeap, iter::FusedIterator};

use super::*;

/// Stepwise Prim growing a minimum spanning tree from `origin`.
///
/// Each node joining the tree (the origin first, silently) has its active records to
/// nodes outside the tree turned into candidates, one [`Step::MstCheck`] per candidate.
/// Then the lightest candidate leading outside the tree is committed with a
/// [`Step::MstAdd`]. The search ends once every node is in the tree or no candidate
/// is left; in the latter case [`Outcome::SpanningTree`] spans only the component of
/// `origin`.
pub struct PrimSteps<G> {
    graph: G,
    origin: Node,
    visited: NodeBitSet,
    heap: BinaryHeap<FrontierEntry>,
    /// Candidates `(weight, inside, outside)` in insertion order
    candidates: Vec<(Weight, Node, Node)>,
    tree: Vec<Edge>,
    cost: Weight,
    frontier: Frontier,
    current: Option<(Node, usize)>,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Growing,
    Done,
    Finished,
}

impl<G: WeightedAdjacencyList> PrimSteps<G> {
    /// # Panics
    /// Panics if `origin >= n`.
    pub fn new(graph: G, origin: Node) -> Self {
        assert!(
            origin < graph.number_of_nodes(),
            "Origin {origin} is not a node of the graph"
        );

        let mut visited = graph.vertex_bitset_unset();
        visited.set_bit(origin);

        Self {
            graph,
            origin,
            visited,
            heap: BinaryHeap::new(),
            candidates: Vec::new(),
            tree: Vec::new(),
            cost: 0.0,
            frontier: Frontier::default(),
            current: Some((origin, 0)),
            phase: Phase::Start,
        }
    }

    /// Selects how the lightest candidate is found.
    /// May be called mid-run: pending candidates move to the new frontier.
    pub fn set_frontier(&mut self, frontier: Frontier) {
        if frontier == self.frontier {
            return;
        }

        match frontier {
            Frontier::BinaryHeap => {
                self.heap.extend(self.candidates.drain(..).map(|(key, inside, outside)| {
                    FrontierEntry {
                        key,
                        node: outside,
                        via: Some(inside),
                    }
                }));
            }
            Frontier::LinearScan => {
                // lightest first, so the scan keeps the heap's tie-breaks
                let origin = self.origin;
                let pending = std::mem::take(&mut self.heap).into_sorted_vec();
                self.candidates.extend(
                    pending
                        .into_iter()
                        .rev()
                        .map(|entry| (entry.key, entry.via.unwrap_or(origin), entry.node)),
                );
            }
        }
        self.frontier = frontier;
    }

    /// Selects how the lightest candidate is found
    pub fn frontier(mut self, frontier: Frontier) -> Self {
        self.set_frontier(frontier);
        self
    }

    /// Turns the next record of the current node into a candidate
    fn check_next(&mut self) -> Option<Step> {
        let (u, cursor) = self.current.as_mut()?;
        let u = *u;

        while let Some((v, weight)) = self.graph.next_neighbor_of(u, cursor) {
            if self.visited.get_bit(v) {
                continue;
            }

            match self.frontier {
                Frontier::BinaryHeap => self.heap.push(FrontierEntry {
                    key: weight,
                    node: v,
                    via: Some(u),
                }),
                Frontier::LinearScan => self.candidates.push((weight, u, v)),
            }

            return Some(Step::MstCheck {
                from: u,
                to: v,
                weight,
            });
        }

        self.current = None;
        None
    }

    /// Removes and returns the lightest candidate `(weight, inside, outside)` leaving the tree
    fn lightest_candidate(&mut self) -> Option<(Weight, Node, Node)> {
        match self.frontier {
            Frontier::BinaryHeap => loop {
                let entry = self.heap.pop()?;
                if !self.visited.get_bit(entry.node) {
                    break Some((entry.key, entry.via.unwrap_or(self.origin), entry.node));
                }
            },
            Frontier::LinearScan => {
                let visited = &self.visited;
                self.candidates.retain(|&(_, _, v)| !visited.get_bit(v));

                let mut best: Option<usize> = None;
                for (i, &(weight, _, _)) in self.candidates.iter().enumerate() {
                    if best.is_none_or(|b| weight < self.candidates[b].0) {
                        best = Some(i);
                    }
                }
                best.map(|i| self.candidates.remove(i))
            }
        }
    }
}

impl<G: WeightedAdjacencyList> Iterator for PrimSteps<G> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Growing;
                    return Some(Step::Notice(Notice::PrimStarted {
                        origin: self.origin,
                    }));
                }
                Phase::Growing => {
                    if let Some(step) = self.check_next() {
                        return Some(step);
                    }

                    if self.visited.cardinality() == self.graph.number_of_nodes() {
                        self.phase = Phase::Done;
                        continue;
                    }

                    let Some((weight, u, v)) = self.lightest_candidate() else {
                        self.phase = Phase::Done;
                        continue;
                    };

                    self.visited.set_bit(v);
                    self.tree.push(Edge(u, v));
                    self.cost += weight;
                    self.current = Some((v, 0));

                    return Some(Step::MstAdd {
                        edge: Edge(u, v),
                        weight,
                        tree: self.tree.clone(),
                    });
                }
                Phase::Done => {
                    self.phase = Phase::Finished;
                    return Some(Step::Finished(Outcome::SpanningTree {
                        edges: std::mem::take(&mut self.tree),
                        cost: self.cost,
                    }));
                }
                Phase::Finished => return None,
            }
        }
    }
}

impl<G: WeightedAdjacencyList> FusedIterator for PrimSteps<G> {}

impl<G: WeightedAdjacencyList> StepSequence for PrimSteps<G> {
    fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

crate::testing::test_frontier_variants!(test_prim, |frontier| {
    fn diamond_spanning_tree() {
        let graph = diamond();
        let outcome = PrimSteps::new(&graph, 0)
            .frontier(frontier)
            .run_to_end()
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::SpanningTree {
                edges: vec![Edge(0, 1), Edge(1, 2), Edge(2, 3)],
                cost: 4.0
            }
        );
    }

    fn diamond_step_order() {
        let graph = diamond();
        let trace = graph
            .prim_steps(0)
            .frontier(frontier)
            .filter_map(|step| match step {
                Step::MstCheck { from, to, weight } => Some(format!("check {from}->{to}={weight}")),
                Step::MstAdd { edge, tree, .. } => Some(format!("add {edge} of {}", tree.len())),
                _ => None,
            })
            .collect_vec();

        assert_eq!(
            trace,
            vec![
                "check 0->1=1",
                "check 0->2=4",
                "add (0,1) of 1",
                "check 1->2=2",
                "add (1,2) of 2",
                "check 2->3=1",
                "add (2,3) of 3"
            ]
        );
    }

    fn spans_only_the_origin_component() {
        let graph = Graph::from_edges(5, [(0, 1, 3.0), (1, 2, 1.0), (3, 4, 1.0)], true);
        let outcome = graph.prim_steps(2).frontier(frontier).run_to_end().unwrap();

        assert_eq!(
            outcome,
            Outcome::SpanningTree {
                edges: vec![Edge(2, 1), Edge(1, 0)],
                cost: 4.0
            }
        );
    }

    fn single_node() {
        let graph = Graph::from_edges(1, [], true);
        let steps = PrimSteps::new(&graph, 0).frontier(frontier).collect_vec();

        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[1],
            Step::Finished(Outcome::SpanningTree {
                edges: vec![],
                cost: 0.0
            })
        );
    }

    fn switching_frontier_mid_run() {
        let graph = diamond();
        let other = match frontier {
            Frontier::BinaryHeap => Frontier::LinearScan,
            Frontier::LinearScan => Frontier::BinaryHeap,
        };
        let len = graph.prim_steps(0).frontier(frontier).count();

        for pulled in 0..len {
            let mut steps = graph.prim_steps(0).frontier(frontier);
            steps.by_ref().take(pulled).for_each(drop);
            steps.set_frontier(other);

            assert_eq!(
                steps.run_to_end(),
                Some(Outcome::SpanningTree {
                    edges: vec![Edge(0, 1), Edge(1, 2), Edge(2, 3)],
                    cost: 4.0
                }),
                "switched after {pulled} steps"
            );
        }
    }

    fn tree_edges_are_active_routes() {
        let rng = &mut rand_pcg::Pcg64Mcg::seed_from_u64(13);

        for _ in 0..30 {
            let mut graph = random_graph(rng, 10, 20, true);
            graph.deactivate_random_edge(rng);

            let Some(Outcome::SpanningTree { edges, .. }) =
                graph.prim_steps(0).frontier(frontier).run_to_end()
            else {
                panic!("expected a spanning tree");
            };

            let component = graph
                .connected_components()
                .find(|cc| cc.contains(&0))
                .unwrap();
            assert_eq!(edges.len() + 1, component.len());
            for Edge(u, v) in edges {
                assert!(graph.neighbors_of(u).any(|(x, _)| x == v));
            }
        }
    }
});

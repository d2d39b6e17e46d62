use std::iter::FusedIterator;

use super::*;

/// Stepwise Bellman-Ford from `origin` to `destination`; tolerates negative weights.
///
/// Runs at most `n - 1` relaxation passes over all active records, each record in its own
/// direction only. Every pass starts with a [`Notice::RelaxationPass`] and emits one
/// [`Step::BellmanFordRelax`] per improvement. A pass without improvement emits
/// [`Notice::ConvergedEarly`] and ends the passes. A final verification pass decides
/// between [`Outcome::NegativeCycle`] (some record can still be relaxed) and
/// [`Outcome::ShortestPath`].
pub struct BellmanFordSteps<G> {
    /// Relaxations read `edges`; the handle only keeps the graph alive and unmodified
    _graph: G,
    origin: Node,
    destination: Node,
    /// Active records `(from, to, weight)` in node-then-insertion order
    edges: Vec<(Node, Node, Weight)>,
    dist: Distances,
    prev: Predecessors,
    pass: NumNodes,
    total: NumNodes,
    cursor: usize,
    improved: bool,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    PassStart,
    Relaxing,
    Verify,
    Finished,
}

impl<G: WeightedAdjacencyList> BellmanFordSteps<G> {
    /// # Panics
    /// Panics if `origin >= n` or `destination >= n`.
    pub fn new(graph: G, origin: Node, destination: Node) -> Self {
        let n = graph.number_of_nodes();
        assert!(origin < n, "Origin {origin} is not a node of the graph");
        assert!(
            destination < n,
            "Destination {destination} is not a node of the graph"
        );

        let edges = graph
            .edge_records()
            .filter(|record| record.active)
            .map(|record| (record.from, record.to, record.weight))
            .collect();

        let mut dist = vec![Weight::INFINITY; n as usize];
        dist[origin as usize] = 0.0;

        Self {
            _graph: graph,
            origin,
            destination,
            edges,
            dist,
            prev: vec![None; n as usize],
            pass: 0,
            total: n.saturating_sub(1),
            cursor: 0,
            improved: false,
            phase: Phase::Start,
        }
    }

    fn improves(&self, (u, v, weight): (Node, Node, Weight)) -> bool {
        let du = self.dist[u as usize];
        du.is_finite() && du + weight < self.dist[v as usize]
    }
}

impl<G: WeightedAdjacencyList> Iterator for BellmanFordSteps<G> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::PassStart;
                    return Some(Step::Notice(Notice::BellmanFordStarted {
                        origin: self.origin,
                    }));
                }
                Phase::PassStart => {
                    if self.pass >= self.total {
                        self.phase = Phase::Verify;
                        continue;
                    }

                    self.pass += 1;
                    self.cursor = 0;
                    self.improved = false;
                    self.phase = Phase::Relaxing;
                    return Some(Step::Notice(Notice::RelaxationPass {
                        pass: self.pass,
                        total: self.total,
                    }));
                }
                Phase::Relaxing => {
                    while let Some(&edge) = self.edges.get(self.cursor) {
                        self.cursor += 1;
                        if !self.improves(edge) {
                            continue;
                        }

                        let (u, v, weight) = edge;
                        let alt = self.dist[u as usize] + weight;
                        self.dist[v as usize] = alt;
                        self.prev[v as usize] = Some(u);
                        self.improved = true;

                        return Some(Step::BellmanFordRelax {
                            from: u,
                            to: v,
                            dist: alt,
                            prev: self.prev.clone(),
                        });
                    }

                    if self.improved {
                        self.phase = Phase::PassStart;
                        continue;
                    }

                    self.phase = Phase::Verify;
                    return Some(Step::Notice(Notice::ConvergedEarly { pass: self.pass }));
                }
                Phase::Verify => {
                    self.phase = Phase::Finished;

                    if self.edges.iter().any(|&edge| self.improves(edge)) {
                        return Some(Step::Finished(Outcome::NegativeCycle));
                    }

                    let (path, cost) = reconstruct_path(&self.dist, &self.prev, self.destination);
                    return Some(Step::Finished(Outcome::ShortestPath { path, cost }));
                }
                Phase::Finished => return None,
            }
        }
    }
}

impl<G: WeightedAdjacencyList> FusedIterator for BellmanFordSteps<G> {}

impl<G: WeightedAdjacencyList> StepSequence for BellmanFordSteps<G> {
    fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::diamond;
    use itertools::Itertools;

    fn passes(steps: &[Step]) -> Vec<NumNodes> {
        steps
            .iter()
            .filter_map(|step| match step {
                Step::Notice(Notice::RelaxationPass { pass, .. }) => Some(*pass),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn agrees_with_dijkstra_on_diamond() {
        let graph = diamond();
        let outcome = graph.bellman_ford_steps(0, 3).run_to_end().unwrap();

        assert_eq!(outcome, graph.dijkstra_steps(0, 3).run_to_end().unwrap());
        assert_eq!(outcome.path(), &[0, 1, 2, 3]);
    }

    #[test]
    fn negative_weights() {
        let graph = Graph::from_edges(3, [(0, 1, 4.0), (0, 2, 2.0), (2, 1, -3.0)], false);
        let outcome = graph.bellman_ford_steps(0, 1).run_to_end().unwrap();

        assert_eq!(
            outcome,
            Outcome::ShortestPath {
                path: vec![0, 2, 1],
                cost: -1.0
            }
        );
    }

    #[test]
    fn converges_early() {
        let graph = Graph::from_edges(4, [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)], false);
        let steps = graph.bellman_ford_steps(0, 3).collect_vec();

        assert_eq!(passes(&steps), vec![1, 2]);
        assert!(steps.contains(&Step::Notice(Notice::ConvergedEarly { pass: 2 })));
        assert_eq!(
            steps
                .iter()
                .filter(|step| matches!(step, Step::BellmanFordRelax { .. }))
                .count(),
            3
        );
        assert_eq!(steps.last().unwrap().clone(), Step::Finished(Outcome::ShortestPath {
            path: vec![0, 1, 2, 3],
            cost: 3.0
        }));
    }

    #[test]
    fn reports_negative_cycle() {
        let graph = Graph::from_edges(
            4,
            [(0, 1, 1.0), (1, 2, -2.0), (2, 1, 1.0), (2, 3, 1.0)],
            false,
        );
        let steps = graph.bellman_ford_steps(0, 3).collect_vec();

        assert_eq!(passes(&steps), vec![1, 2, 3]);
        assert_eq!(
            steps.last().unwrap().clone(),
            Step::Finished(Outcome::NegativeCycle)
        );
        assert!(
            !steps
                .iter()
                .any(|step| matches!(step, Step::Notice(Notice::ConvergedEarly { .. })))
        );
    }

    #[test]
    fn negative_undirected_route_is_a_negative_cycle() {
        let graph = Graph::from_edges(2, [(0, 1, -1.0)], true);
        assert_eq!(
            graph.bellman_ford_steps(0, 1).run_to_end(),
            Some(Outcome::NegativeCycle)
        );
    }

    #[test]
    fn unreachable_and_trivial() {
        let graph = Graph::from_edges(3, [(1, 0, 1.0)], false);
        let outcome = graph.bellman_ford_steps(0, 2).run_to_end().unwrap();
        assert!(outcome.path().is_empty());
        assert_eq!(outcome.cost(), Some(Weight::INFINITY));

        let graph = Graph::from_edges(1, [], false);
        let steps = graph.bellman_ford_steps(0, 0).collect_vec();
        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[1],
            Step::Finished(Outcome::ShortestPath {
                path: vec![0],
                cost: 0.0
            })
        );
    }
}

use std::{collections::VecDeque, iter::FusedIterator};

use super::*;

/// Stepwise breadth-first search from an origin.
///
/// Emits, in this order:
/// - [`Notice::BfsStarted`],
/// - per dequeued node `u` a [`Step::BfsVisit`], followed by one [`Step::BfsEnqueue`] per
///   newly discovered active neighbor (`level` is the level of the discovered node),
/// - [`Notice::AllReachableSecured`] once the queue ran empty,
/// - [`Step::Finished`] with [`Outcome::Reached`].
pub struct BfsSteps<G> {
    graph: G,
    queue: VecDeque<Node>,
    visited: NodeBitSet,
    levels: Vec<Option<NumNodes>>,
    /// Node whose neighborhood is being scanned and the scan position
    current: Option<(Node, usize)>,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Searching,
    Secured,
    Done,
    Finished,
}

impl<G: WeightedAdjacencyList> BfsSteps<G> {
    /// Prepares a search from `origin`. Nothing is computed before the first call to `next`.
    ///
    /// # Panics
    /// Panics if `origin >= n`.
    pub fn new(graph: G, origin: Node) -> Self {
        let n = graph.number_of_nodes();
        assert!(origin < n, "Origin {origin} is not a node of the graph");

        let mut visited = graph.vertex_bitset_unset();
        visited.set_bit(origin);
        let mut levels = vec![None; n as usize];
        levels[origin as usize] = Some(0);

        Self {
            graph,
            queue: VecDeque::from(vec![origin]),
            visited,
            levels,
            current: None,
            phase: Phase::Start,
        }
    }

    fn level_of(&self, u: Node) -> NumNodes {
        self.levels[u as usize].unwrap_or_default()
    }
}

impl<G: WeightedAdjacencyList> Iterator for BfsSteps<G> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Searching;
                    let origin = self.queue.front().copied().unwrap_or_default();
                    return Some(Step::Notice(Notice::BfsStarted { origin }));
                }
                Phase::Searching => {
                    if let Some((u, cursor)) = self.current.as_mut() {
                        let u = *u;
                        while let Some((v, _)) = self.graph.next_neighbor_of(u, cursor) {
                            if self.visited.set_bit(v) {
                                continue;
                            }

                            let level = self.levels[u as usize].map_or(1, |l| l + 1);
                            self.levels[v as usize] = Some(level);
                            self.queue.push_back(v);
                            return Some(Step::BfsEnqueue {
                                from: u,
                                to: v,
                                level,
                                visited: self.visited.clone(),
                            });
                        }
                        self.current = None;
                    }

                    match self.queue.pop_front() {
                        Some(u) => {
                            self.current = Some((u, 0));
                            return Some(Step::BfsVisit {
                                node: u,
                                level: self.level_of(u),
                                visited: self.visited.clone(),
                            });
                        }
                        None => self.phase = Phase::Secured,
                    }
                }
                Phase::Secured => {
                    self.phase = Phase::Done;
                    return Some(Step::Notice(Notice::AllReachableSecured));
                }
                Phase::Done => {
                    self.phase = Phase::Finished;
                    return Some(Step::Finished(Outcome::Reached {
                        visited: self.visited.clone(),
                        levels: self.levels.clone(),
                    }));
                }
                Phase::Finished => return None,
            }
        }
    }
}

impl<G: WeightedAdjacencyList> FusedIterator for BfsSteps<G> {}

impl<G: WeightedAdjacencyList> StepSequence for BfsSteps<G> {
    fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

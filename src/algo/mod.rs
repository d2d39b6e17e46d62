/*!
# Stepwise Graph Algorithms

Every algorithm of this module is a suspendable state machine implementing
`Iterator<Item = Step>`. Each call to `next` runs the algorithm to its next emission
point and returns a [`Step`]; the last step of every sequence is
[`Step::Finished`] carrying the [`Outcome`]. Dropping a sequence abandons the run.

```rust
use stepgraphs::{prelude::*, algo::*};

let mut graph = Graph::new();
for name in ["Super Earth", "Mars", "Heeth"] {
    graph.add_node(name);
}
graph.add_route("Super Earth", "Mars", 1.0).unwrap();

let steps = graph.bfs_steps(0).collect::<Vec<_>>();
assert!(matches!(steps[0], Step::Notice(Notice::BfsStarted { origin: 0 })));
assert!(steps.last().unwrap().is_terminal());
```

The algorithms are generic over any owned [`WeightedAdjacencyList`]: borrow a graph with
`&graph` (as the [`StepwiseAlgorithms`] methods do) or share it via `Rc<Graph>` if the
sequence has to live next to the graph, as in [`driver::Playback`](crate::driver::Playback).

Beside the stepwise algorithms, [`Connectivity`] and [`Bridges`] analyze the active
subgraph in one go.
*/

mod bellman_ford;
mod bfs;
mod bridges;
mod connectivity;
mod cycle;
mod dijkstra;
mod frontier;
mod prim;
mod step;

use std::fmt::{self, Display};

use crate::prelude::*;

pub use bellman_ford::*;
pub use bfs::*;
pub use bridges::*;
pub use connectivity::*;
pub use cycle::*;
pub use dijkstra::*;
pub use frontier::Frontier;
pub use prim::*;
pub use step::*;

pub(crate) use frontier::FrontierEntry;

/// A sequence of steps ending in [`Step::Finished`].
pub trait StepSequence: Iterator<Item = Step> {
    /// Returns *true* once the terminal step has been handed out
    fn is_finished(&self) -> bool;

    /// Pulls all remaining steps and returns the outcome of the terminal step.
    /// Returns `None` if the terminal step was already consumed.
    fn run_to_end(&mut self) -> Option<Outcome> {
        let mut outcome = None;
        while let Some(step) = self.next() {
            if let Step::Finished(result) = step {
                outcome = Some(result);
            }
        }
        outcome
    }
}

/// Starts the stepwise algorithms on a borrowed graph.
pub trait StepwiseAlgorithms: WeightedAdjacencyList + Sized {
    /// Breadth-first search from `origin`, see [`BfsSteps`]
    fn bfs_steps(&self, origin: Node) -> BfsSteps<&Self> {
        BfsSteps::new(self, origin)
    }

    /// Dijkstra's shortest path from `origin` to `destination`, see [`DijkstraSteps`]
    fn dijkstra_steps(&self, origin: Node, destination: Node) -> DijkstraSteps<&Self> {
        DijkstraSteps::new(self, origin, destination)
    }

    /// Bellman-Ford's shortest path from `origin` to `destination`, see [`BellmanFordSteps`]
    fn bellman_ford_steps(&self, origin: Node, destination: Node) -> BellmanFordSteps<&Self> {
        BellmanFordSteps::new(self, origin, destination)
    }

    /// Depth-first search for a directed cycle, see [`CycleSearch`]
    fn cycle_search(&self) -> CycleSearch<&Self> {
        CycleSearch::new(self)
    }

    /// Prim's spanning tree of the component of `origin`, see [`PrimSteps`]
    fn prim_steps(&self, origin: Node) -> PrimSteps<&Self> {
        PrimSteps::new(self, origin)
    }
}

impl<G: WeightedAdjacencyList> StepwiseAlgorithms for G {}

/// The algorithms a driver can start by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Bfs,
    Dijkstra,
    BellmanFord,
    CycleDetection,
    Prim,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bfs,
        Algorithm::Dijkstra,
        Algorithm::BellmanFord,
        Algorithm::CycleDetection,
        Algorithm::Prim,
    ];

    /// Returns *true* if the algorithm starts from a selected origin
    pub fn needs_origin(&self) -> bool {
        !matches!(self, Algorithm::CycleDetection)
    }

    /// Returns *true* if the algorithm searches a path to a selected destination
    pub fn needs_destination(&self) -> bool {
        matches!(self, Algorithm::Dijkstra | Algorithm::BellmanFord)
    }

    /// Starts the algorithm on `graph`.
    ///
    /// `frontier` is only used by Dijkstra and Prim.
    /// Fails with [`GraphError::MissingSelection`] if a required origin or destination is
    /// `None`.
    ///
    /// # Panics
    /// Panics if a selected node is not in `0..n`.
    pub fn start<'a, G>(
        self,
        graph: G,
        origin: Option<Node>,
        destination: Option<Node>,
        frontier: Frontier,
    ) -> Result<Box<dyn StepSequence + 'a>, GraphError>
    where
        G: WeightedAdjacencyList + 'a,
    {
        let missing = |what| GraphError::MissingSelection {
            algorithm: self,
            missing: what,
        };

        let origin = match (self.needs_origin(), origin) {
            (true, None) => return Err(missing("origin")),
            (_, origin) => origin.unwrap_or_default(),
        };
        let destination = match (self.needs_destination(), destination) {
            (true, None) => return Err(missing("destination")),
            (_, destination) => destination.unwrap_or_default(),
        };

        Ok(match self {
            Algorithm::Bfs => Box::new(BfsSteps::new(graph, origin)),
            Algorithm::Dijkstra => {
                Box::new(DijkstraSteps::new(graph, origin, destination).frontier(frontier))
            }
            Algorithm::BellmanFord => Box::new(BellmanFordSteps::new(graph, origin, destination)),
            Algorithm::CycleDetection => Box::new(CycleSearch::new(graph)),
            Algorithm::Prim => Box::new(PrimSteps::new(graph, origin).frontier(frontier)),
        })
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::BellmanFord => "Bellman-Ford",
            Algorithm::CycleDetection => "Cycle detection",
            Algorithm::Prim => "Prim",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::diamond;

    #[test]
    fn start_requires_selections() {
        let graph = diamond();

        assert_eq!(
            Algorithm::Dijkstra
                .start(&graph, Some(0), None, Frontier::default())
                .err(),
            Some(GraphError::MissingSelection {
                algorithm: Algorithm::Dijkstra,
                missing: "destination"
            })
        );
        assert_eq!(
            Algorithm::Prim
                .start(&graph, None, None, Frontier::default())
                .err()
                .map(|e| e.to_string()),
            Some("Prim needs a selected origin".to_string())
        );
        assert!(
            Algorithm::CycleDetection
                .start(&graph, None, None, Frontier::default())
                .is_ok()
        );
    }

    #[test]
    fn every_algorithm_terminates_once() {
        let graph = diamond();

        for algo in Algorithm::ALL {
            let mut steps = algo
                .start(&graph, Some(0), Some(3), Frontier::LinearScan)
                .unwrap();

            assert!(!steps.is_finished());
            assert!(matches!(steps.next(), Some(Step::Notice(_))), "{algo}");
            assert!(steps.run_to_end().is_some(), "{algo}");
            assert!(steps.is_finished());
            assert_eq!(steps.next(), None);
            assert_eq!(steps.run_to_end(), None);
        }
    }
}

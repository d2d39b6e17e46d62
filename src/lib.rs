/*!
`stepgraphs` animates classic graph algorithms one **step** at a time.

Instead of a function returning a final answer, every algorithm is a suspendable
state machine: an [`Iterator`] over [`Step`](crate::algo::Step) records that a
consumer (a render loop, a test harness, a headless driver) pulls at its own pace.
Each pull advances the algorithm to its next emission point and hands out a
self-contained snapshot of what just happened. The last record of every sequence is
a [`Step::Finished`](crate::algo::Step::Finished) carrying the final
[`Outcome`](crate::algo::Outcome).

# Representation

Nodes are **planets**, registered by name. The `i`-th registered planet is node `i`
and all algorithms work on these dense `u32` indices; [`Graph::node_id`](crate::repr::Graph::node_id)
and [`Graph::name_of`](crate::repr::Graph::name_of) translate between both worlds.

Edges are stored as directed, weighted **records** that can be deactivated (but never
deleted). An undirected route is two records, one per direction, which are always
deactivated together. Deactivated records stay in storage and are only skipped by
neighbor queries.

# Usage

There are *4* submodules you probably want to interact with:
- [`prelude`] includes nodes, edges, the graph store and its traits,
- [`algo`] includes the five stepwise algorithms (BFS, Dijkstra, Bellman-Ford, cycle
  detection, Prim), the step records they emit and connectivity analysis,
- [`driver`] includes a headless playback loop that pulls steps on a timer or on demand
  and folds them into presentation state,
- [`error`] includes the error type of all fallible operations.

In most use-cases, `use stepgraphs::{prelude::*, algo::*};` suffices for your needs.

```
use stepgraphs::{prelude::*, algo::*};

let mut graph = Graph::new();
for name in ["A", "B", "C", "D"] {
    graph.add_node(name);
}
graph.add_route("A", "B", 1.0).unwrap();
graph.add_route("B", "C", 2.0).unwrap();
graph.add_route("A", "C", 4.0).unwrap();
graph.add_route("C", "D", 1.0).unwrap();

let (a, d) = (graph.node_id("A").unwrap(), graph.node_id("D").unwrap());
let outcome = graph.dijkstra_steps(a, d).run_to_end().unwrap();

assert_eq!(outcome.path(), &[0, 1, 2, 3]);
assert_eq!(outcome.cost(), Some(4.0));
```
*/

pub mod algo;
pub mod driver;
pub mod edge;
pub mod error;
pub mod node;
pub mod ops;
pub mod repr;
pub(crate) mod testing;

/// `stepgraphs::prelude` includes definitions for nodes and edges, the graph traits and the graph store.
pub mod prelude {
    pub use super::{edge::*, error::GraphError, node::*, ops::*, repr::*};
}

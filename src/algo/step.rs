/*!
Step records emitted by the stepwise algorithms.

A [`Step`] is an immutable snapshot of one unit of progress. Every map it carries
(distances, predecessors, colors, visited sets, tree edges) is a copy taken at the
moment of emission, so later progress of the algorithm never changes a step that has
already been handed out.
*/

use std::fmt::{self, Display};

use super::*;

/// Distance from the origin per node, `Weight::INFINITY` if not (yet) reached
pub type Distances = Vec<Weight>;

/// Predecessor per node on the best known path from the origin
pub type Predecessors = Vec<Option<Node>>;

/// DFS state of a node during cycle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Not visited yet
    #[default]
    White,
    /// On the current DFS path
    Gray,
    /// Completely explored
    Black,
}

/// One unit of algorithmic progress.
///
/// Consumers should match the kinds they are interested in and ignore everything else;
/// new kinds may be added.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Step {
    /// Informational message without algorithmic state
    Notice(Notice),

    /// BFS dequeued `node`
    BfsVisit {
        node: Node,
        level: NumNodes,
        visited: NodeBitSet,
    },
    /// BFS discovered `to` from `from` and enqueued it
    BfsEnqueue {
        from: Node,
        to: Node,
        level: NumNodes,
        visited: NodeBitSet,
    },

    /// Dijkstra settled `node`
    DijkstraVisit {
        node: Node,
        dist: Distances,
        prev: Predecessors,
    },
    /// Dijkstra improved the distance of `to` via `from`
    DijkstraRelax {
        from: Node,
        to: Node,
        dist: Weight,
        prev: Predecessors,
    },

    /// Bellman-Ford improved the distance of `to` via `from`
    BellmanFordRelax {
        from: Node,
        to: Node,
        dist: Weight,
        prev: Predecessors,
    },

    /// DFS entered `node` and colored it gray
    CycleEnter { node: Node, colors: Vec<Color> },
    /// DFS descends along the tree edge `from -> to`
    CycleTreeEdge { from: Node, to: Node },
    /// DFS found the back edge `from -> to` closing a cycle
    CycleBackEdge { from: Node, to: Node },
    /// DFS finished `node` and colored it black
    CycleExit { node: Node, colors: Vec<Color> },

    /// Prim considers the candidate edge `from -> to`
    MstCheck { from: Node, to: Node, weight: Weight },
    /// Prim added `edge` to the tree; `tree` are all tree edges so far
    MstAdd {
        edge: Edge,
        weight: Weight,
        tree: Vec<Edge>,
    },

    /// Terminal step of every sequence
    Finished(Outcome),
}

impl Step {
    /// Returns *true* if this is the terminal step of a sequence
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Finished(_))
    }

    /// Returns the node this step is focused on, if any
    pub fn focus(&self) -> Option<Node> {
        match self {
            Step::BfsVisit { node, .. }
            | Step::DijkstraVisit { node, .. }
            | Step::CycleEnter { node, .. }
            | Step::CycleExit { node, .. } => Some(*node),
            Step::BfsEnqueue { to, .. }
            | Step::DijkstraRelax { to, .. }
            | Step::BellmanFordRelax { to, .. }
            | Step::CycleTreeEdge { to, .. }
            | Step::CycleBackEdge { to, .. }
            | Step::MstCheck { to, .. } => Some(*to),
            Step::MstAdd { edge, .. } => Some(edge.1),
            Step::Notice(_) | Step::Finished(_) => None,
        }
    }
}

/// Final result of a stepwise algorithm, carried by [`Step::Finished`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Outcome {
    /// BFS: all nodes reachable from the origin and their hop distance
    Reached {
        visited: NodeBitSet,
        levels: Vec<Option<NumNodes>>,
    },
    /// Dijkstra / Bellman-Ford: the shortest path (empty and infinite cost if unreachable)
    ShortestPath { path: Vec<Node>, cost: Weight },
    /// Bellman-Ford: a negative cycle made the distances unstable
    NegativeCycle,
    /// Cycle detection: a directed cycle (implicitly closed to its first node) or `None`
    Cycle(Option<Vec<Node>>),
    /// Prim: the spanning tree of the origin's component
    SpanningTree { edges: Vec<Edge>, cost: Weight },
}

impl Outcome {
    /// Returns the shortest path, or an empty slice for every other outcome
    pub fn path(&self) -> &[Node] {
        match self {
            Outcome::ShortestPath { path, .. } => path,
            _ => &[],
        }
    }

    /// Returns the cost of a shortest path or spanning tree.
    /// A negative cycle has infinite cost.
    pub fn cost(&self) -> Option<Weight> {
        match self {
            Outcome::ShortestPath { cost, .. } | Outcome::SpanningTree { cost, .. } => Some(*cost),
            Outcome::NegativeCycle => Some(Weight::INFINITY),
            _ => None,
        }
    }
}

/// Informational messages.
///
/// Use [`Notice::render`] to obtain the text shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Notice {
    BfsStarted { origin: Node },
    AllReachableSecured,
    DijkstraStarted { origin: Node, destination: Node },
    BellmanFordStarted { origin: Node },
    /// Bellman-Ford begins relaxation pass `pass` (1-based) out of `total`
    RelaxationPass { pass: NumNodes, total: NumNodes },
    /// Bellman-Ford pass `pass` improved nothing; the remaining passes are skipped
    ConvergedEarly { pass: NumNodes },
    CycleSearchStarted,
    NoCycle,
    PrimStarted { origin: Node },
}

impl Notice {
    /// Returns the message with node indices replaced by planet names
    pub fn render(&self, graph: &Graph) -> String {
        Rendered {
            notice: *self,
            graph,
        }
        .to_string()
    }
}

struct Rendered<'a> {
    notice: Notice,
    graph: &'a Graph,
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |u: Node| self.graph.name_of(u);
        match self.notice {
            Notice::BfsStarted { origin } => write!(
                f,
                "Spreading Managed Democracy from {}!",
                name(origin)
            ),
            Notice::AllReachableSecured => write!(f, "Every reachable planet has been secured!"),
            Notice::DijkstraStarted {
                origin,
                destination,
            } => write!(
                f,
                "Computing optimal logistics (Dijkstra) from {} to {}...",
                name(origin),
                name(destination)
            ),
            Notice::BellmanFordStarted { origin } => write!(
                f,
                "Relaxing routes (Bellman-Ford) to calibrate paths from {}...",
                name(origin)
            ),
            Notice::RelaxationPass { pass, total } => {
                write!(f, "Relaxation pass {pass}/{total}...")
            }
            Notice::ConvergedEarly { pass } => write!(
                f,
                "Pass {pass} improved nothing. Optimisation converged early."
            ),
            Notice::CycleSearchStarted => {
                write!(f, "Psychic sweep started. Searching for route paradoxes...")
            }
            Notice::NoCycle => write!(f, "No psychic circuit detected."),
            Notice::PrimStarted { origin } => write!(
                f,
                "Building the supply network (Prim) from {}...",
                name(origin)
            ),
        }
    }
}

/// Walks `prev` back from `destination` and returns the path from the origin together
/// with its cost. The path is empty iff `dist[destination]` is infinite.
pub(crate) fn reconstruct_path(
    dist: &[Weight],
    prev: &[Option<Node>],
    destination: Node,
) -> (Vec<Node>, Weight) {
    let cost = dist[destination as usize];
    if cost == Weight::INFINITY {
        return (Vec::new(), cost);
    }

    let mut path = vec![destination];
    let mut node = destination;
    while let Some(p) = prev[node as usize] {
        // a negative cycle can close a loop in `prev`
        if path.len() > prev.len() {
            break;
        }
        path.push(p);
        node = p;
    }

    path.reverse();
    (path, cost)
}

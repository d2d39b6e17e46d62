use std::iter::FusedIterator;

use super::*;

/// Stepwise depth-first search for a directed cycle.
///
/// Every active record is treated as directed, so an undirected route already forms a
/// cycle of length two. DFS roots are the white nodes in registration order.
///
/// Emits [`Notice::CycleSearchStarted`], then [`Step::CycleEnter`], [`Step::CycleTreeEdge`]
/// and [`Step::CycleExit`] while exploring. The first [`Step::CycleBackEdge`] ends the
/// search with `Outcome::Cycle(Some(nodes))`, where `nodes` runs along the cycle from the
/// head of the back edge to its tail. Otherwise [`Notice::NoCycle`] and
/// `Outcome::Cycle(None)` are emitted.
pub struct CycleSearch<G> {
    graph: G,
    colors: Vec<Color>,
    pred: Predecessors,
    call_stack: Vec<StackFrame>,
    /// No white node precedes this one
    next_root: Node,
    cycle: Option<Vec<Node>>,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Searching,
    Found,
    NoCycle,
    Done,
    Finished,
}

/// Simulated recursive call of the DFS
#[derive(Debug, Clone, Copy)]
struct StackFrame {
    node: Node,
    cursor: usize,
    entered: bool,
}

impl StackFrame {
    fn new(node: Node) -> Self {
        Self {
            node,
            cursor: 0,
            entered: false,
        }
    }
}

impl<G: WeightedAdjacencyList> CycleSearch<G> {
    pub fn new(graph: G) -> Self {
        let n = graph.len();
        Self {
            graph,
            colors: vec![Color::White; n],
            pred: vec![None; n],
            call_stack: Vec::with_capacity(n),
            next_root: 0,
            cycle: None,
            phase: Phase::Start,
        }
    }

    /// Walks the predecessors from `tail` back to `head`
    fn close_cycle(&self, tail: Node, head: Node) -> Vec<Node> {
        let mut cycle = vec![tail];
        let mut x = tail;
        while x != head {
            match self.pred[x as usize] {
                Some(p) => {
                    x = p;
                    cycle.push(p);
                }
                None => break,
            }
        }
        cycle.reverse();
        cycle
    }

    fn search(&mut self) -> Option<Step> {
        while let Some(frame) = self.call_stack.last_mut() {
            let u = frame.node;

            if !frame.entered {
                frame.entered = true;
                self.colors[u as usize] = Color::Gray;
                return Some(Step::CycleEnter {
                    node: u,
                    colors: self.colors.clone(),
                });
            }

            while let Some((v, _)) = self.graph.next_neighbor_of(u, &mut frame.cursor) {
                match self.colors[v as usize] {
                    Color::White => {
                        self.pred[v as usize] = Some(u);
                        self.call_stack.push(StackFrame::new(v));
                        return Some(Step::CycleTreeEdge { from: u, to: v });
                    }
                    Color::Gray => {
                        self.cycle = Some(self.close_cycle(u, v));
                        self.phase = Phase::Found;
                        return Some(Step::CycleBackEdge { from: u, to: v });
                    }
                    Color::Black => {}
                }
            }

            self.call_stack.pop();
            self.colors[u as usize] = Color::Black;
            return Some(Step::CycleExit {
                node: u,
                colors: self.colors.clone(),
            });
        }

        None
    }

    /// Pushes the next white node as DFS root; returns *false* if there is none
    fn push_next_root(&mut self) -> bool {
        let n = self.graph.number_of_nodes();
        while self.next_root < n && self.colors[self.next_root as usize] != Color::White {
            self.next_root += 1;
        }

        if self.next_root < n {
            self.call_stack.push(StackFrame::new(self.next_root));
            true
        } else {
            false
        }
    }
}

impl<G: WeightedAdjacencyList> Iterator for CycleSearch<G> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Searching;
                    return Some(Step::Notice(Notice::CycleSearchStarted));
                }
                Phase::Searching => {
                    if let Some(step) = self.search() {
                        return Some(step);
                    }
                    if !self.push_next_root() {
                        self.phase = Phase::NoCycle;
                    }
                }
                Phase::Found => {
                    self.phase = Phase::Finished;
                    return Some(Step::Finished(Outcome::Cycle(self.cycle.take())));
                }
                Phase::NoCycle => {
                    self.phase = Phase::Done;
                    return Some(Step::Notice(Notice::NoCycle));
                }
                Phase::Done => {
                    self.phase = Phase::Finished;
                    return Some(Step::Finished(Outcome::Cycle(None)));
                }
                Phase::Finished => return None,
            }
        }
    }
}

impl<G: WeightedAdjacencyList> FusedIterator for CycleSearch<G> {}

impl<G: WeightedAdjacencyList> StepSequence for CycleSearch<G> {
    fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

use std::cmp::Ordering;

use super::*;

/// Strategy to select the next node (Dijkstra) or edge (Prim) from the frontier.
///
/// Both strategies produce the same distances and the same tree cost. They differ in
/// tie-breaking and thus possibly in the order of emitted steps:
/// - [`Frontier::BinaryHeap`] breaks ties by the smaller node index (then by the smaller
///   tree endpoint for Prim) and lazily skips stale entries without emitting a step,
/// - [`Frontier::LinearScan`] rescans all candidates in every round and picks the first
///   minimum in scan order (node order for Dijkstra, insertion order for Prim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Frontier {
    #[default]
    BinaryHeap,
    LinearScan,
}

/// Entry of a min-heap keyed by `key`.
///
/// `via` is the tree endpoint for Prim and `None` for Dijkstra.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrontierEntry {
    pub key: Weight,
    pub node: Node,
    pub via: Option<Node>,
}

impl FrontierEntry {
    fn rank(&self) -> (Node, Node) {
        (self.node, self.via.unwrap_or(self.node))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    /// Reversed, so that `BinaryHeap` pops the smallest key first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.rank().cmp(&self.rank()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn pops_smallest_key_then_smallest_node() {
        let mut heap = BinaryHeap::new();
        for (key, node) in [(3.0, 0), (1.0, 4), (1.0, 2), (0.5, 9)] {
            heap.push(FrontierEntry {
                key,
                node,
                via: None,
            });
        }

        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|e| (e.key, e.node))
            .collect();
        assert_eq!(order, vec![(0.5, 9), (1.0, 2), (1.0, 4), (3.0, 0)]);
    }
}

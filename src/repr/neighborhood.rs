use std::{iter::FusedIterator, slice::Iter};

use super::*;

/// Iterator over the active records of one adjacency list, yielding `(v, weight)`.
///
/// Returned by [`WeightedAdjacencyList::neighbors_of`]. Cloning the iterator restarts
/// the scan from the clone's position.
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    records: Iter<'a, EdgeRecord>,
}

impl<'a> Neighbors<'a> {
    /// Creates a view over `records`, skipping inactive ones
    pub fn new(records: &'a [EdgeRecord]) -> Self {
        Self {
            records: records.iter(),
        }
    }
}

impl Iterator for Neighbors<'_> {
    type Item = (Node, Weight);

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .find(|record| record.active)
            .map(|record| (record.to, record.weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.records.len()))
    }
}

impl FusedIterator for Neighbors<'_> {}

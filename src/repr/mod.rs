/*!
# Graph Representation

This module defines the graph store the stepwise algorithms operate on.

- [`Graph`]: planets registered by name plus one adjacency list of weighted
  [`EdgeRecord`]s per planet, insertion order preserved.
- [`Neighbors`]: the lazy view over the *active* records leaving a node.

## Design
- Undirected routes are two directed records sharing a [`RouteId`]; a route index maps
  every route to the positions of its records, so deactivating a route touches exactly
  its records.
- Records are soft-deleted only: deactivated records stay visible through
  [`WeightedAdjacencyList::edge_records`] and are skipped by
  [`WeightedAdjacencyList::neighbors_of`].
*/

use crate::{edge::*, node::*, ops::*};

mod adjacency;
mod neighborhood;

pub use adjacency::*;
pub use neighborhood::*;

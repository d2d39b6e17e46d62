/*!
# Errors

All fallible operations of this crate return [`GraphError`].
Algorithmic outcomes such as an unreachable destination or a negative cycle are *not*
errors; they are reported through the terminal [`Step`](crate::algo::Step) of a sequence.
*/

use crate::algo::Algorithm;

/// Errors that can occur while building a graph or driving an algorithm.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("route endpoint `{0}` is not a registered planet")]
    InvalidReference(String),
    #[error("unknown planet `{0}`")]
    UnknownNode(String),
    #[error("{algorithm} needs a selected {missing}")]
    MissingSelection {
        algorithm: Algorithm,
        missing: &'static str,
    },
    #[error("routes cannot change while an algorithm is running")]
    RunInProgress,
}

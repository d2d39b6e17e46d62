/*!
# Node Representation

We choose `Node = u32` as the graphs animated here are tiny and nodes are used as
direct indices into distance, predecessor and color arrays.
Every node carries a [`Planet`] with its name and purely cosmetic attributes.
*/

use stream_bitset::bitset::BitSetImpl;

/// Nodes are the registration indices `0..n` of the planets in a graph
pub type Node = u32;

/// There can be at most `2^32 - 1` nodes in a graph!
pub type NumNodes = Node;

/// BitSet for Nodes
pub type NodeBitSet = BitSetImpl<Node>;

/// The payload of a node.
///
/// Only the name is an identity: it is unique within a graph and fixed once the planet
/// is created. Faction, position and liberation status are read by renderers and never
/// by the algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Planet {
    name: String,
    /// Faction currently holding the planet
    pub faction: String,
    /// Screen position
    pub position: (i32, i32),
    /// Liberation progress
    pub liberation: u32,
    /// Whether the planet takes part in the current mission
    pub in_mission: bool,
}

impl Planet {
    /// Creates a planet held by `faction` at `position`, not yet liberated
    pub fn new(name: impl Into<String>, faction: impl Into<String>, position: (i32, i32)) -> Self {
        Self {
            name: name.into(),
            faction: faction.into(),
            position,
            liberation: 0,
            in_mission: true,
        }
    }

    /// Creates a planet with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, String::new(), (0, 0))
    }

    /// Unique key of the planet
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Planet {
    fn from(name: &str) -> Self {
        Planet::named(name)
    }
}

impl From<String> for Planet {
    fn from(name: String) -> Self {
        Planet::named(name)
    }
}

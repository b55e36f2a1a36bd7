use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact handle for a node in the obligation graph.
///
/// Node names are interned by
/// [`WeightedDirectedGraph`](crate::graph::weighted_graph::WeightedDirectedGraph);
/// everything on the hot path (agent paths, the ownership map, graph
/// storage) works on `NodeId` and resolves back to the name only for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Identity of a worm agent: the index of the arena slot it occupies.
///
/// Slots are reused once an agent finishes, so an `AgentId` is only
/// meaningful while its agent is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(usize);

impl AgentId {
    pub fn new(slot: usize) -> Self {
        Self(slot)
    }

    pub fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worm#{}", self.0)
    }
}

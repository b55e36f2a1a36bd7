use crate::core::error::{EngineError, Result};
use crate::core::node::{AgentId, NodeId};
use std::collections::HashMap;

/// Which agent currently holds which node on its path.
///
/// A node is present exactly while it sits on some agent's path, and never
/// for more than one agent. Claims and releases that would break this fail
/// with an invariant error instead of being tolerated.
#[derive(Debug, Clone, Default)]
pub struct PathOwnership {
    owners: HashMap<NodeId, AgentId>,
}

impl PathOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, node: NodeId) -> Option<AgentId> {
        self.owners.get(&node).copied()
    }

    pub fn is_owned(&self, node: NodeId) -> bool {
        self.owners.contains_key(&node)
    }

    /// The owner of `node` if it is someone other than `agent`.
    pub fn other_owner(&self, node: NodeId, agent: AgentId) -> Option<AgentId> {
        self.owner(node).filter(|owner| *owner != agent)
    }

    /// Record that `agent` pushed `node` onto its path.
    pub fn claim(&mut self, node: NodeId, agent: AgentId) -> Result<()> {
        if let Some(owner) = self.owner(node) {
            return Err(EngineError::NodeAlreadyOwned { node, agent, owner });
        }
        self.owners.insert(node, agent);
        Ok(())
    }

    /// Record that `agent` took `node` off its path.
    pub fn release(&mut self, node: NodeId, agent: AgentId) -> Result<()> {
        match self.owner(node) {
            Some(owner) if owner == agent => {
                self.owners.remove(&node);
                Ok(())
            }
            owner => Err(EngineError::NotOwner { node, agent, owner }),
        }
    }

    /// Number of owned nodes.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, AgentId)> + '_ {
        self.owners.iter().map(|(n, a)| (*n, *a))
    }
}

use crate::core::error::{EngineError, Result};
use crate::core::node::{AgentId, NodeId};
use crate::worms::agent::WormAgent;

/// Fixed set of agent slots with a free list.
///
/// An agent's id is its slot index, and slots are handed out lowest first
/// and reused once their agent finishes.
#[derive(Debug, Clone)]
pub struct AgentArena {
    slots: Vec<Option<WormAgent>>,
    /// Free slot indices, next to hand out last
    free: Vec<usize>,
}

impl AgentArena {
    pub fn with_capacity(ceiling: usize) -> Self {
        Self {
            slots: (0..ceiling).map(|_| None).collect(),
            free: (0..ceiling).rev().collect(),
        }
    }

    /// Maximum number of concurrent agents.
    pub fn ceiling(&self) -> usize {
        self.slots.len()
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Place a new agent starting at `start` in the lowest free slot.
    pub fn spawn(&mut self, start: NodeId) -> Result<AgentId> {
        let slot = self.free.pop().ok_or(EngineError::SlotsExhausted {
            ceiling: self.ceiling(),
        })?;
        let id = AgentId::new(slot);
        self.slots[slot] = Some(WormAgent::new(id, start));
        Ok(id)
    }

    /// Free the slot of a finished agent.
    pub fn remove(&mut self, id: AgentId) -> Result<WormAgent> {
        let agent = self
            .slots
            .get_mut(id.slot())
            .and_then(Option::take)
            .ok_or(EngineError::UnknownAgent { agent: id })?;
        // keep the lowest free slot on top
        let pos = self.free.partition_point(|s| *s > id.slot());
        self.free.insert(pos, id.slot());
        Ok(agent)
    }

    pub fn get(&self, id: AgentId) -> Option<&WormAgent> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut WormAgent> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Ids of live agents in slot order.
    pub fn active_ids(&self) -> Vec<AgentId> {
        self.iter().map(|a| a.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WormAgent> + '_ {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_fill_lowest_first_and_are_reused() {
        let mut arena = AgentArena::with_capacity(3);
        let a = arena.spawn(NodeId::new(0)).unwrap();
        let b = arena.spawn(NodeId::new(1)).unwrap();
        let c = arena.spawn(NodeId::new(2)).unwrap();
        assert_eq!((a.slot(), b.slot(), c.slot()), (0, 1, 2));
        assert!(arena.is_full());

        arena.remove(b).unwrap();
        arena.remove(a).unwrap();
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.active_ids(), vec![c]);

        assert_eq!(arena.spawn(NodeId::new(5)).unwrap(), a);
        assert_eq!(arena.spawn(NodeId::new(6)).unwrap(), b);
        assert_eq!(arena.get(b).unwrap().pending(), Some(NodeId::new(6)));
    }

    #[test]
    fn test_spawn_into_full_arena_fails() {
        let mut arena = AgentArena::with_capacity(1);
        arena.spawn(NodeId::new(0)).unwrap();
        assert!(matches!(
            arena.spawn(NodeId::new(1)),
            Err(EngineError::SlotsExhausted { ceiling: 1 })
        ));
    }

    #[test]
    fn test_remove_unknown_agent_fails() {
        let mut arena = AgentArena::with_capacity(2);
        assert!(arena.remove(AgentId::new(1)).is_err());
        assert!(arena.remove(AgentId::new(9)).is_err());
        assert!(arena.get_mut(AgentId::new(0)).is_none());
    }
}

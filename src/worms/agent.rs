use crate::core::error::Result;
use crate::core::node::{AgentId, NodeId};
use crate::graph::weighted_graph::WeightedDirectedGraph;
use crate::optimization::netting::NettingEngine;
use crate::report::cycle_log::CycleSink;
use crate::worms::ownership::PathOwnership;
use crate::worms::stats::NettingStats;
use log::debug;

/// Lifecycle of a worm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    /// Spawned, start node not claimed yet.
    Spawning,
    Active,
    Killed,
}

/// Why a worm stopped. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillReason {
    /// The next node sits on another worm's path.
    Collision { node: NodeId, with: AgentId },
    /// Backtracking out of dead ends emptied the path.
    DeadEnd,
    /// Closing a loop consumed the whole path.
    Drained,
}

/// Result of one phase of a worm's step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Finished(KillReason),
}

impl StepOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, StepOutcome::Finished(_))
    }
}

/// A single walker: a path of claimed nodes and the node it will claim next.
///
/// Each tick the scheduler calls [`advance`](Self::advance) on every worm,
/// then [`close_loops`](Self::close_loops) on every worm still alive. A worm
/// always follows the first outgoing edge of its path top; it prunes edges
/// into dead ends as it backs out of them and nets every loop its path
/// closes.
#[derive(Debug, Clone)]
pub struct WormAgent {
    id: AgentId,
    path: Vec<NodeId>,
    /// `None` when the path top lost its outgoing edges during netting;
    /// the next advance then backtracks without claiming
    pending: Option<NodeId>,
    status: AgentStatus,
}

impl WormAgent {
    /// A worm that will claim `start` on its first advance.
    pub fn new(id: AgentId, start: NodeId) -> Self {
        Self {
            id,
            path: Vec::new(),
            pending: Some(start),
            status: AgentStatus::Spawning,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Claimed nodes, most recent last.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn pending(&self) -> Option<NodeId> {
        self.pending
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    /// Phase 1: claim the pending node, back out of dead ends, pick the next node.
    pub fn advance(
        &mut self,
        graph: &mut WeightedDirectedGraph,
        ownership: &mut PathOwnership,
        stats: &mut NettingStats,
    ) -> Result<StepOutcome> {
        if let Some(next) = self.pending.take() {
            if let Some(owner) = ownership.other_owner(next, self.id) {
                return self.kill(ownership, KillReason::Collision { node: next, with: owner });
            }
            ownership.claim(next, self.id)?;
            self.path.push(next);
            self.status = AgentStatus::Active;
        }

        while let Some(&top) = self.path.last() {
            if graph.has_outgoing_links(top) {
                break;
            }
            self.path.pop();
            ownership.release(top, self.id)?;
            if let Some(&previous) = self.path.last() {
                if let Some(weight) = graph.remove_link(previous, top) {
                    stats.record_pruned(weight);
                }
            }
        }

        self.choose_next(graph, ownership)
    }

    /// Phase 2: net every loop the pending node closes.
    ///
    /// Repeats until the pending node is off the worm's own path, so the next
    /// advance never claims a node the worm already holds.
    pub fn close_loops<S: CycleSink + ?Sized>(
        &mut self,
        graph: &mut WeightedDirectedGraph,
        ownership: &mut PathOwnership,
        stats: &mut NettingStats,
        sink: &mut S,
    ) -> Result<StepOutcome> {
        while let Some(next) = self.pending {
            let Some(pos) = self.path.iter().position(|n| *n == next) else {
                break;
            };

            let mut cycle = self.path.split_off(pos);
            for node in &cycle {
                ownership.release(*node, self.id)?;
            }
            cycle.push(next);

            if let Some(netted) = NettingEngine::net_loop(graph, &cycle)? {
                debug!("{} netted {}", self.id, netted);
                stats.record_cycle(&netted);
                sink.record(&netted)?;
            }

            if self.path.is_empty() {
                return self.kill(ownership, KillReason::Drained);
            }
            if let StepOutcome::Finished(reason) = self.choose_next(graph, ownership)? {
                return Ok(StepOutcome::Finished(reason));
            }
        }
        Ok(StepOutcome::Continue)
    }

    /// Release every node on the path and stop.
    pub fn kill(
        &mut self,
        ownership: &mut PathOwnership,
        reason: KillReason,
    ) -> Result<StepOutcome> {
        while let Some(node) = self.path.pop() {
            ownership.release(node, self.id)?;
        }
        self.pending = None;
        self.status = AgentStatus::Killed;
        debug!("{} finished: {:?}", self.id, reason);
        Ok(StepOutcome::Finished(reason))
    }

    fn choose_next(
        &mut self,
        graph: &WeightedDirectedGraph,
        ownership: &mut PathOwnership,
    ) -> Result<StepOutcome> {
        let Some(&top) = self.path.last() else {
            return self.kill(ownership, KillReason::DeadEnd);
        };
        self.pending = None;
        let Some(candidate) = graph.first_outgoing_node(top) else {
            return Ok(StepOutcome::Continue);
        };
        if let Some(owner) = ownership.other_owner(candidate, self.id) {
            return self.kill(ownership, KillReason::Collision { node: candidate, with: owner });
        }
        self.pending = Some(candidate);
        Ok(StepOutcome::Continue)
    }
}

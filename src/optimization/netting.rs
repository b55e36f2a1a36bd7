use crate::core::error::Result;
use crate::core::node::NodeId;
use crate::graph::weighted_graph::WeightedDirectedGraph;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cycle that has been netted out of the graph.
///
/// `nodes` lists the cycle in traversal order without repeating the start
/// node; the last node owes the first one. `amount` is the bottleneck that
/// was cancelled on every hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettedCycle {
    pub nodes: Vec<String>,
    pub amount: u64,
}

impl NettedCycle {
    /// Number of nodes (and hops) in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gross debt removed from the graph: the amount on every hop.
    pub fn gross_reduction(&self) -> u64 {
        self.amount * self.nodes.len() as u64
    }
}

/// Result-log line: the cycle's nodes followed by the netted amount.
impl fmt::Display for NettedCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{} ", node)?;
        }
        write!(f, "{}", self.amount)
    }
}

/// Cycle netting on a [`WeightedDirectedGraph`].
pub struct NettingEngine;

impl NettingEngine {
    /// Minimum edge weight along the consecutive hops of a closed cycle.
    ///
    /// `cycle` repeats its start node at the end. A missing hop counts as 0.
    pub fn bottleneck(graph: &WeightedDirectedGraph, cycle: &[NodeId]) -> u64 {
        cycle
            .windows(2)
            .map(|hop| graph.weight(hop[0], hop[1]))
            .min()
            .unwrap_or(0)
    }

    /// Cancel the bottleneck amount around a closed cycle.
    ///
    /// For every hop `u -> v` a reverse debt `v -> u` of the bottleneck amount
    /// is added; the graph's bilateral netting cancels it against the forward
    /// edge, so every hop drops by exactly the bottleneck and at least one hop
    /// disappears. Returns `None` (and leaves the graph untouched) when the
    /// bottleneck is zero.
    pub fn net_loop(
        graph: &mut WeightedDirectedGraph,
        cycle: &[NodeId],
    ) -> Result<Option<NettedCycle>> {
        let amount = Self::bottleneck(graph, cycle);
        if amount == 0 {
            warn!("skipping cycle of {} hops with zero bottleneck", cycle.len().saturating_sub(1));
            return Ok(None);
        }

        for hop in cycle.windows(2) {
            graph.add_weight(hop[1], hop[0], amount)?;
        }

        let nodes = cycle[..cycle.len() - 1]
            .iter()
            .map(|n| graph.name(*n).to_string())
            .collect();
        Ok(Some(NettedCycle { nodes, amount }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::Ledger;
    use crate::core::obligation::{Obligation, ObligationSet};

    fn graph_of(edges: &[(&str, &str, u64)]) -> WeightedDirectedGraph {
        let set: ObligationSet = edges
            .iter()
            .map(|(from, to, w)| Obligation::new(*from, *to, *w))
            .collect();
        WeightedDirectedGraph::from_obligations(&set).unwrap()
    }

    fn ids(graph: &WeightedDirectedGraph, names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| graph.node_id(n).unwrap()).collect()
    }

    #[test]
    fn test_simple_cycle_drains() {
        let mut graph = graph_of(&[("A", "B", 5), ("B", "C", 5), ("C", "A", 5)]);
        let cycle = ids(&graph, &["A", "B", "C", "A"]);

        let netted = NettingEngine::net_loop(&mut graph, &cycle).unwrap().unwrap();
        assert_eq!(netted.nodes, vec!["A", "B", "C"]);
        assert_eq!(netted.amount, 5);
        assert_eq!(netted.to_string(), "A B C 5");
        assert_eq!(netted.gross_reduction(), 15);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_asymmetric_cycle_subtracts_bottleneck() {
        let mut graph = graph_of(&[
            ("A", "B", 100),
            ("B", "C", 80),
            ("C", "A", 120),
            ("C", "D", 3),
        ]);
        let before = Ledger::from_graph(&graph);
        let cycle = ids(&graph, &["A", "B", "C", "A"]);
        let (a, b, c) = (cycle[0], cycle[1], cycle[2]);

        assert_eq!(NettingEngine::bottleneck(&graph, &cycle), 80);
        let netted = NettingEngine::net_loop(&mut graph, &cycle).unwrap().unwrap();

        assert_eq!(netted.amount, 80);
        assert_eq!(graph.weight(a, b), 20);
        assert_eq!(graph.weight(b, c), 0);
        assert_eq!(graph.weight(c, a), 40);
        assert_eq!(graph.weight(b, a), 0);
        assert_eq!(Ledger::from_graph(&graph).non_zero(), before.non_zero());
    }

    #[test]
    fn test_broken_cycle_is_a_no_op() {
        let mut graph = graph_of(&[("A", "B", 5), ("B", "C", 5)]);
        let cycle = ids(&graph, &["A", "B", "C", "A"]);

        assert_eq!(NettingEngine::bottleneck(&graph, &cycle), 0);
        assert!(NettingEngine::net_loop(&mut graph, &cycle).unwrap().is_none());
        assert_eq!(graph.total_weight(), 10);
        assert!(NettingEngine::net_loop(&mut graph, &[]).unwrap().is_none());
    }
}

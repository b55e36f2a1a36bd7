use crate::core::obligation::ObligationSet;
use crate::graph::weighted_graph::WeightedDirectedGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net position of each node.
///
/// A positive balance means the node is owed (net creditor).
/// A negative balance means the node owes (net debtor).
///
/// Bilateral netting and cycle netting never move a node's net position;
/// only dead-end pruning does, by writing off an edge. Comparing ledgers
/// before and after netting is how conservation is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    positions: BTreeMap<String, i128>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net positions implied by a raw obligation list.
    pub fn from_obligations(set: &ObligationSet) -> Self {
        let mut ledger = Self::new();
        for ob in set.obligations() {
            ledger.apply(ob.debtor(), ob.creditor(), ob.amount());
        }
        ledger
    }

    /// Net positions implied by the edges currently in a graph.
    pub fn from_graph(graph: &WeightedDirectedGraph) -> Self {
        let mut ledger = Self::new();
        for (from, to, weight) in graph.edges() {
            ledger.apply(graph.name(from), graph.name(to), weight);
        }
        ledger
    }

    /// Record that `debtor` owes `creditor` `amount`.
    pub fn apply(&mut self, debtor: &str, creditor: &str, amount: u64) {
        let amount = i128::from(amount);
        *self.positions.entry(debtor.to_string()).or_insert(0) -= amount;
        *self.positions.entry(creditor.to_string()).or_insert(0) += amount;
    }

    pub fn position(&self, node: &str) -> i128 {
        self.positions.get(node).copied().unwrap_or(0)
    }

    /// Positions with zero balances removed, so ledgers built from different
    /// edge sets compare equal when they settle the same way.
    pub fn non_zero(&self) -> BTreeMap<&str, i128> {
        self.positions
            .iter()
            .filter(|(_, v)| **v != 0)
            .map(|(k, v)| (k.as_str(), *v))
            .collect()
    }

    /// Verify that the ledger is balanced: all positions sum to zero.
    pub fn is_balanced(&self) -> bool {
        self.positions.values().sum::<i128>() == 0
    }

    /// Total amount that still has to settle (sum of positive positions).
    pub fn total_net_settlement(&self) -> u128 {
        self.positions
            .values()
            .filter(|v| **v > 0)
            .map(|v| v.unsigned_abs())
            .sum()
    }
}

use crate::optimization::netting::NettedCycle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cycles found for one cycle length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthStats {
    pub count: u64,
    pub total_amount: u64,
}

/// Running totals of a netting run.
///
/// Owned by the scheduler and handed to agents by reference, so separate
/// runs never share counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NettingStats {
    by_length: BTreeMap<usize, LengthStats>,
    longest: Option<NettedCycle>,
    cycles_found: u64,
    pruned_edges: u64,
    /// Debt written off by dead-end pruning
    pruned_weight: u64,
}

impl NettingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&mut self, cycle: &NettedCycle) {
        let entry = self.by_length.entry(cycle.len()).or_default();
        entry.count += 1;
        entry.total_amount += cycle.amount;
        self.cycles_found += 1;

        // first cycle of a given length wins ties
        if self.longest.as_ref().map_or(true, |l| cycle.len() > l.len()) {
            self.longest = Some(cycle.clone());
        }
    }

    pub fn record_pruned(&mut self, weight: u64) {
        self.pruned_edges += 1;
        self.pruned_weight += weight;
    }

    pub fn cycles_found(&self) -> u64 {
        self.cycles_found
    }

    pub fn pruned_edges(&self) -> u64 {
        self.pruned_edges
    }

    pub fn pruned_weight(&self) -> u64 {
        self.pruned_weight
    }

    pub fn longest(&self) -> Option<&NettedCycle> {
        self.longest.as_ref()
    }

    pub fn by_length(&self) -> &BTreeMap<usize, LengthStats> {
        &self.by_length
    }

    /// Gross debt removed by cycle netting: amount times hops, summed.
    pub fn gross_netted(&self) -> u64 {
        self.by_length
            .iter()
            .map(|(len, s)| s.total_amount * *len as u64)
            .sum()
    }

    /// Mean netted amount for cycles of `len` nodes.
    pub fn average_amount(&self, len: usize) -> Option<f64> {
        self.by_length
            .get(&len)
            .filter(|s| s.count > 0)
            .map(|s| s.total_amount as f64 / s.count as f64)
    }
}

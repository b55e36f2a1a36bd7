use crate::optimization::netting::NettedCycle;
use crate::worms::scheduler::RunEnd;
use crate::worms::stats::LengthStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Final (or intermediate) statistics of a netting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// How the run ended, `None` while it is still going.
    pub end: Option<RunEnd>,
    pub ticks: u64,
    pub cycles_found: u64,
    pub pruned_edges: u64,
    pub active_agents: usize,
    /// Cycle count and netted amount per cycle length.
    pub by_length: BTreeMap<usize, LengthStats>,
    pub longest: Option<NettedCycle>,
    /// Gross debt in the graph when the run started.
    pub initial_weight: u64,
    /// Gross debt cancelled by cycle netting.
    pub netted_weight: u64,
    /// Gross debt written off by dead-end pruning.
    pub pruned_weight: u64,
    pub residual_weight: u64,
    pub residual_edges: usize,
}

impl RunSummary {
    /// Share of the initial gross debt cancelled by cycle netting.
    pub fn savings_ratio(&self) -> f64 {
        if self.initial_weight == 0 {
            return 0.0;
        }
        self.netted_weight as f64 / self.initial_weight as f64
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Netting Run ===")?;
        writeln!(f, "Started:           {}", self.started_at.to_rfc3339())?;
        writeln!(f, "Elapsed:           {} ms", self.elapsed_ms)?;
        match self.end {
            Some(end) => writeln!(f, "Ended by:          {}", end)?,
            None => writeln!(f, "Ended by:          (still running)")?,
        }
        writeln!(f, "Ticks:             {}", self.ticks)?;
        writeln!(f, "Cycles found:      {}", self.cycles_found)?;
        writeln!(f, "Edges pruned:      {}", self.pruned_edges)?;
        writeln!(f, "Active worms:      {}", self.active_agents)?;
        writeln!(f, "Initial debt:      {}", self.initial_weight)?;
        writeln!(f, "Netted by cycles:  {}", self.netted_weight)?;
        writeln!(f, "Pruned:            {}", self.pruned_weight)?;
        writeln!(
            f,
            "Residual:          {} over {} edges",
            self.residual_weight, self.residual_edges
        )?;
        writeln!(f, "Savings Ratio:     {:.1}%", self.savings_ratio() * 100.0)?;

        if !self.by_length.is_empty() {
            writeln!(f, "\nCycles by length:")?;
            for (len, stats) in &self.by_length {
                writeln!(
                    f,
                    "  {:>3} nodes: {} cycles, {} netted",
                    len, stats.count, stats.total_amount
                )?;
            }
        }

        if let Some(longest) = &self.longest {
            writeln!(
                f,
                "\nLongest cycle ({} nodes, amount {}):",
                longest.len(),
                longest.amount
            )?;
            writeln!(f, "  {}", longest.nodes.join(" "))?;
        }
        Ok(())
    }
}

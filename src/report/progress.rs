use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of a run in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub tick: u64,
    pub cycles_found: u64,
    pub pruned_edges: u64,
    pub active_agents: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: {} cycles found, {} edges pruned, {} worms active",
            self.tick, self.cycles_found, self.pruned_edges, self.active_agents
        )
    }
}

/// Logs a progress line every `every` ticks.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    every: u64,
    reported: u64,
}

impl ProgressReporter {
    /// `every == 0` disables reporting.
    pub fn new(every: u64) -> Self {
        Self { every, reported: 0 }
    }

    /// Report `progress` if its tick falls on the cadence. Returns whether it did.
    pub fn observe(&mut self, progress: &Progress) -> bool {
        if self.every == 0 || progress.tick == 0 || progress.tick % self.every != 0 {
            return false;
        }
        info!("{}", progress);
        self.reported += 1;
        true
    }

    /// Number of reports emitted so far.
    pub fn reported(&self) -> u64 {
        self.reported
    }
}

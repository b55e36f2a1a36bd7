//! Run configuration.
//!
//! The spawn interval is the one knob a run is normally tuned with; the
//! rest default to fixed constants and exist mostly for tests and
//! benchmarks.

use crate::core::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SPAWN_INTERVAL: u64 = 1;
pub const MAX_AGENTS: usize = 100;
pub const MAX_TICKS: u64 = 1_000_000;
/// Wall-clock ceiling after which a run is forcibly stopped.
pub const TIME_LIMIT_SECS: u64 = 3_600;
pub const REPORT_EVERY: u64 = 10_000;

/// Configuration of a [`WormScheduler`](crate::worms::scheduler::WormScheduler) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ticks between spawn attempts.
    pub spawn_interval: u64,
    /// Concurrency ceiling: the number of agent slots.
    pub max_agents: usize,
    /// Total tick budget.
    pub max_ticks: u64,
    /// Wall-clock budget, checked between ticks.
    pub time_limit_secs: u64,
    /// Ticks between progress reports. 0 disables them.
    pub report_every: u64,
    /// Seed for spawn-point sampling. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            max_agents: MAX_AGENTS,
            max_ticks: MAX_TICKS,
            time_limit_secs: TIME_LIMIT_SECS,
            report_every: REPORT_EVERY,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration with the given spawn interval.
    pub fn with_spawn_interval(spawn_interval: u64) -> Self {
        Self {
            spawn_interval,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spawn_interval == 0 {
            return Err(EngineError::Config(
                "spawn_interval must be at least 1".to_string(),
            ));
        }
        if self.max_agents == 0 {
            return Err(EngineError::Config(
                "max_agents must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

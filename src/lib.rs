//! # worm-netting
//!
//! Multilateral debt netting by cycle cancellation.
//!
//! Given a directed graph of obligations ("A owes B amount X"), a pool of
//! cooperative walkers ("worms") repeatedly finds directed cycles and cancels
//! the minimum weight around each one. Total outstanding debt goes down without
//! any cash changing hands.
//!
//! ## Architecture
//!
//! - **core** — Node identities, obligations, ledger, error types
//! - **graph** — Weighted directed graph with bilateral netting on insert
//! - **optimization** — Cycle bottleneck computation and loop netting
//! - **worms** — Path ownership, worm agents, agent arena, scheduler, statistics
//! - **report** — Cycle result log and run summaries
//! - **simulation** — Random obligation networks for testing and benchmarks

pub mod config;
pub mod core;
pub mod graph;
pub mod optimization;
pub mod report;
pub mod simulation;
pub mod worms;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::SchedulerConfig;
    pub use crate::core::error::{EngineError, GraphExhausted, Result};
    pub use crate::core::ledger::Ledger;
    pub use crate::core::node::{AgentId, NodeId};
    pub use crate::core::obligation::{Obligation, ObligationSet};
    pub use crate::graph::weighted_graph::WeightedDirectedGraph;
    pub use crate::optimization::netting::{NettedCycle, NettingEngine};
    pub use crate::report::cycle_log::{CycleLog, CycleSink};
    pub use crate::report::summary::RunSummary;
    pub use crate::worms::scheduler::{RunEnd, WormScheduler};
}

use crate::config::SchedulerConfig;
use crate::core::error::{EngineError, GraphExhausted, Result};
use crate::core::node::{AgentId, NodeId};
use crate::graph::weighted_graph::WeightedDirectedGraph;
use crate::report::cycle_log::CycleSink;
use crate::report::progress::{Progress, ProgressReporter};
use crate::report::summary::RunSummary;
use crate::worms::agent::{KillReason, StepOutcome};
use crate::worms::arena::AgentArena;
use crate::worms::ownership::PathOwnership;
use crate::worms::stats::NettingStats;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEnd {
    /// The graph has no nodes left: everything was netted or pruned.
    Exhausted,
    /// The tick budget ran out.
    TickBudget,
    /// The wall-clock budget ran out.
    TimeLimit,
}

impl fmt::Display for RunEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEnd::Exhausted => write!(f, "graph exhausted"),
            RunEnd::TickBudget => write!(f, "tick budget reached"),
            RunEnd::TimeLimit => write!(f, "time limit reached"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnAttempt {
    Spawned,
    /// No free slot or no bored node this interval
    Skipped,
    Exhausted,
}

/// Drives a pool of worms over a shared graph, one lockstep tick at a time.
///
/// A tick:
///
/// 1. every `spawn_interval` ticks, spawns a worm on a random bored node
///    (unowned, with an outgoing edge) if a slot is free;
/// 2. runs phase 1 ([`advance`](crate::worms::agent::WormAgent::advance))
///    for every worm in slot order;
/// 3. runs phase 2 ([`close_loops`](crate::worms::agent::WormAgent::close_loops))
///    for every worm that survived phase 1;
/// 4. frees the slots of finished worms.
///
/// Within phase 1 a later worm sees claims made by earlier worms in the same
/// tick; the barrier between the phases means no phase 2 mutation is visible
/// to a phase 1 collision check of the same tick.
pub struct WormScheduler<S: CycleSink> {
    config: SchedulerConfig,
    graph: WeightedDirectedGraph,
    ownership: PathOwnership,
    agents: AgentArena,
    stats: NettingStats,
    sink: S,
    rng: StdRng,
    reporter: ProgressReporter,
    tick: u64,
    initial_weight: u64,
    started_at: DateTime<Utc>,
    started: Instant,
    end: Option<RunEnd>,
    /// Wall time from construction to the end of the run
    elapsed: Option<Duration>,
}

impl<S: CycleSink> WormScheduler<S> {
    pub fn new(graph: WeightedDirectedGraph, config: SchedulerConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            agents: AgentArena::with_capacity(config.max_agents),
            reporter: ProgressReporter::new(config.report_every),
            initial_weight: graph.total_weight(),
            graph,
            ownership: PathOwnership::new(),
            stats: NettingStats::new(),
            sink,
            rng,
            tick: 0,
            started_at: Utc::now(),
            started: Instant::now(),
            end: None,
            elapsed: None,
            config,
        })
    }

    /// Run ticks until the graph is exhausted or a budget runs out.
    ///
    /// Budgets are only checked between ticks.
    pub fn run(&mut self) -> Result<RunEnd> {
        if let Some(end) = self.end {
            return Ok(end);
        }
        info!(
            "netting {} edges over {} nodes, spawn interval {}, up to {} worms",
            self.graph.edge_count(),
            self.graph.node_count(),
            self.config.spawn_interval,
            self.config.max_agents
        );
        let time_limit = Duration::from_secs(self.config.time_limit_secs);
        let end = loop {
            if self.tick >= self.config.max_ticks {
                break RunEnd::TickBudget;
            }
            if self.started.elapsed() >= time_limit {
                break RunEnd::TimeLimit;
            }
            if let Some(end) = self.tick()? {
                break end;
            }
        };
        self.finish(end);
        self.sink.flush()?;
        info!("run ended after {} ticks: {}", self.tick, end);
        Ok(end)
    }

    /// Perform a single tick. Returns `Some` once the graph is exhausted.
    pub fn tick(&mut self) -> Result<Option<RunEnd>> {
        if let Some(end) = self.end {
            return Ok(Some(end));
        }
        if self.graph.is_empty() {
            return self.finish_exhausted().map(Some);
        }

        if self.tick % self.config.spawn_interval == 0
            && self.try_spawn()? == SpawnAttempt::Exhausted
        {
            return self.finish_exhausted().map(Some);
        }
        self.tick += 1;

        let ids = self.agents.active_ids();
        let mut finished: Vec<AgentId> = Vec::new();
        for &id in &ids {
            let agent = self
                .agents
                .get_mut(id)
                .ok_or(EngineError::UnknownAgent { agent: id })?;
            let outcome = agent.advance(&mut self.graph, &mut self.ownership, &mut self.stats)?;
            if outcome.is_finished() {
                finished.push(id);
            }
        }

        for &id in &ids {
            if finished.contains(&id) {
                continue;
            }
            let agent = self
                .agents
                .get_mut(id)
                .ok_or(EngineError::UnknownAgent { agent: id })?;
            let outcome = agent.close_loops(
                &mut self.graph,
                &mut self.ownership,
                &mut self.stats,
                &mut self.sink,
            )?;
            if let StepOutcome::Finished(_) = outcome {
                finished.push(id);
            }
        }

        for id in finished {
            self.agents.remove(id)?;
        }

        let progress = self.progress();
        self.reporter.observe(&progress);

        if self.graph.is_empty() {
            return self.finish_exhausted().map(Some);
        }
        Ok(None)
    }

    /// Spawn a worm on a specific node, bypassing the spawn cadence.
    ///
    /// Fails with [`EngineError::SlotsExhausted`] when every slot is taken.
    pub fn spawn_at(&mut self, node: NodeId) -> Result<AgentId> {
        let id = self.agents.spawn(node)?;
        debug!("spawned {} at {}", id, self.graph.name(node));
        Ok(id)
    }

    fn try_spawn(&mut self) -> Result<SpawnAttempt> {
        if self.agents.len() >= self.config.max_agents {
            return Ok(SpawnAttempt::Skipped);
        }
        let graph = &self.graph;
        let ownership = &self.ownership;
        let bored = graph.pick_random_node_where(&mut self.rng, |n| {
            !ownership.is_owned(n) && graph.has_outgoing_links(n)
        });
        match bored {
            Err(GraphExhausted) => Ok(SpawnAttempt::Exhausted),
            Ok(None) => Ok(SpawnAttempt::Skipped),
            // below the ceiling the arena must have a free slot
            Ok(Some(node)) => self.spawn_at(node).map(|_| SpawnAttempt::Spawned),
        }
    }

    fn finish_exhausted(&mut self) -> Result<RunEnd> {
        for id in self.agents.active_ids() {
            let mut agent = self.agents.remove(id)?;
            agent.kill(&mut self.ownership, KillReason::DeadEnd)?;
        }
        self.finish(RunEnd::Exhausted);
        Ok(RunEnd::Exhausted)
    }

    fn finish(&mut self, end: RunEnd) {
        self.end = Some(end);
        self.elapsed = Some(self.started.elapsed());
    }

    pub fn progress(&self) -> Progress {
        Progress {
            tick: self.tick,
            cycles_found: self.stats.cycles_found(),
            pruned_edges: self.stats.pruned_edges(),
            active_agents: self.agents.len(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            elapsed_ms: self
                .elapsed
                .unwrap_or_else(|| self.started.elapsed())
                .as_millis() as u64,
            end: self.end,
            ticks: self.tick,
            cycles_found: self.stats.cycles_found(),
            pruned_edges: self.stats.pruned_edges(),
            active_agents: self.agents.len(),
            by_length: self.stats.by_length().clone(),
            longest: self.stats.longest().cloned(),
            initial_weight: self.initial_weight,
            netted_weight: self.stats.gross_netted(),
            pruned_weight: self.stats.pruned_weight(),
            residual_weight: self.graph.total_weight(),
            residual_edges: self.graph.edge_count(),
        }
    }

    pub fn graph(&self) -> &WeightedDirectedGraph {
        &self.graph
    }

    pub fn ownership(&self) -> &PathOwnership {
        &self.ownership
    }

    pub fn agents(&self) -> &AgentArena {
        &self.agents
    }

    pub fn stats(&self) -> &NettingStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Hand back the residual graph and the sink.
    pub fn into_parts(self) -> (WeightedDirectedGraph, S) {
        (self.graph, self.sink)
    }
}

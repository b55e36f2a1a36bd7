//! Cooperative cycle-finding walkers.
//!
//! Every tick the [`scheduler::WormScheduler`] advances all active agents in
//! two phases: first each agent claims its pending node and backtracks out of
//! dead ends, then each surviving agent closes and nets any loop in its path.
//! The [`ownership::PathOwnership`] map guarantees that a node sits on at most
//! one agent's path at a time.

pub mod agent;
pub mod arena;
pub mod ownership;
pub mod scheduler;
pub mod stats;

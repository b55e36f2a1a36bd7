use crate::core::node::{AgentId, NodeId};
use thiserror::Error;

/// Fatal failures of a netting run.
///
/// Expected outcomes (an agent colliding with another one, a path dead-ending,
/// the graph running out of nodes) are not represented here; they travel as
/// ordinary return values. Everything below either means the input could not
/// be used or the ownership/path bookkeeping has drifted, and the run must stop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{agent} tried to claim {node}, which is already owned by {owner}")]
    NodeAlreadyOwned {
        node: NodeId,
        agent: AgentId,
        owner: AgentId,
    },
    #[error("{agent} tried to release {node}, but its owner is {}", owner_label(.owner))]
    NotOwner {
        node: NodeId,
        agent: AgentId,
        owner: Option<AgentId>,
    },
    #[error("no live agent in slot {agent}")]
    UnknownAgent { agent: AgentId },
    #[error("all {ceiling} agent slots are taken although the active count is below the ceiling")]
    SlotsExhausted { ceiling: usize },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("debt from {debtor} to {creditor} does not fit in a u64")]
    AmountOverflow { debtor: String, creditor: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn owner_label(owner: &Option<AgentId>) -> String {
    owner.map_or_else(|| "nobody".to_string(), |o| o.to_string())
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Signal that the graph has no nodes left.
///
/// This is how sampling reports that there is nothing left to net; it is the
/// normal way a run completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("graph is empty")]
pub struct GraphExhausted;

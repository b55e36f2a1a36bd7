//! Random obligation networks.
//!
//! Used by the CLI's `generate` command, the benchmarks and the property
//! tests to exercise netting on inputs with plenty of overlapping cycles.

use crate::core::obligation::{Obligation, ObligationSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for generating a random obligation network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of nodes in the network.
    pub node_count: usize,
    /// Average number of obligations per node.
    pub avg_obligations_per_node: usize,
    /// Minimum obligation amount.
    pub min_amount: u64,
    /// Maximum obligation amount (inclusive).
    pub max_amount: u64,
    /// Seed for reproducible networks. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 10,
            avg_obligations_per_node: 3,
            min_amount: 1,
            max_amount: 1_000,
            seed: None,
        }
    }
}

/// Generate a random obligation network.
///
/// Debtor and creditor always differ. Fewer than two nodes yields an empty set.
pub fn generate_random_network(config: &NetworkConfig) -> ObligationSet {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut set = ObligationSet::new();
    if config.node_count < 2 {
        return set;
    }

    let nodes: Vec<String> = (0..config.node_count)
        .map(|i| format!("N{:04}", i))
        .collect();
    let min_amount = config.min_amount.max(1);
    let max_amount = config.max_amount.max(min_amount);

    for _ in 0..config.node_count * config.avg_obligations_per_node {
        let debtor = rng.gen_range(0..nodes.len());
        let mut creditor = rng.gen_range(0..nodes.len());
        while creditor == debtor {
            creditor = rng.gen_range(0..nodes.len());
        }
        let amount = rng.gen_range(min_amount..=max_amount);
        set.add(Obligation::new(
            nodes[debtor].as_str(),
            nodes[creditor].as_str(),
            amount,
        ));
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::weighted_graph::WeightedDirectedGraph;

    #[test]
    fn test_random_network_generation() {
        let config = NetworkConfig {
            node_count: 5,
            avg_obligations_per_node: 3,
            ..Default::default()
        };

        let set = generate_random_network(&config);
        assert_eq!(set.len(), 15);
        assert!(set.obligations().iter().all(|o| !o.is_self_obligation()));
        assert!(set
            .obligations()
            .iter()
            .all(|o| (1..=1_000).contains(&o.amount())));
    }

    #[test]
    fn test_seeded_networks_repeat() {
        let config = NetworkConfig {
            node_count: 20,
            seed: Some(3),
            ..Default::default()
        };
        let first = generate_random_network(&config);
        let second = generate_random_network(&config);
        assert_eq!(first.obligations(), second.obligations());

        let graph = WeightedDirectedGraph::from_obligations(&first).unwrap();
        assert!(graph.total_weight() as u128 <= first.gross_total());
    }

    #[test]
    fn test_degenerate_sizes() {
        let config = NetworkConfig {
            node_count: 1,
            ..Default::default()
        };
        assert!(generate_random_network(&config).is_empty());
    }
}

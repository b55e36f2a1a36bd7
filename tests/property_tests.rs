use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use worm_netting::config::SchedulerConfig;
use worm_netting::core::ledger::Ledger;
use worm_netting::core::obligation::{Obligation, ObligationSet};
use worm_netting::graph::weighted_graph::WeightedDirectedGraph;
use worm_netting::optimization::netting::{NettedCycle, NettingEngine};
use worm_netting::worms::scheduler::{RunEnd, WormScheduler};

const NODES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Generate a random node name from a small pool (to increase cycle probability).
fn arb_node() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NODES.to_vec())
}

/// Generate a random positive amount.
fn arb_amount() -> impl Strategy<Value = u64> {
    1u64..1_000u64
}

/// Generate a random obligation (ensuring debtor != creditor).
fn arb_obligation() -> impl Strategy<Value = Obligation> {
    (arb_node(), arb_node(), arb_amount()).prop_filter_map(
        "debtor must differ from creditor",
        |(debtor, creditor, amount)| {
            if debtor == creditor {
                None
            } else {
                Some(Obligation::new(debtor, creditor, amount))
            }
        },
    )
}

/// Generate a random obligation set of 1..40 obligations.
fn arb_obligation_set() -> impl Strategy<Value = ObligationSet> {
    prop::collection::vec(arb_obligation(), 1..40)
        .prop_map(|obs| obs.into_iter().collect::<ObligationSet>())
}

/// A simple cycle over 3..=6 distinct nodes with one weight per hop.
fn arb_ring() -> impl Strategy<Value = (Vec<&'static str>, Vec<u64>)> {
    prop::sample::subsequence(NODES.to_vec(), 3..=6).prop_flat_map(|nodes| {
        let hops = nodes.len();
        (Just(nodes), prop::collection::vec(arb_amount(), hops))
    })
}

fn config(max_agents: usize, seed: u64) -> SchedulerConfig {
    SchedulerConfig {
        max_agents,
        max_ticks: 100_000,
        seed: Some(seed),
        report_every: 0,
        ..Default::default()
    }
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Bilateral netting leaves |w1 - w2| on the larger side.
    // ===================================================================
    #[test]
    fn bilateral_netting_keeps_difference(w1 in arb_amount(), w2 in arb_amount()) {
        let mut graph = WeightedDirectedGraph::new();
        let a = graph.intern("A");
        let b = graph.intern("B");
        prop_assert_eq!(graph.add_weight(a, b, w1).unwrap(), 0);
        let netted = graph.add_weight(b, a, w2).unwrap();

        prop_assert_eq!(netted, w1.min(w2));
        prop_assert_eq!(graph.weight(a, b), w1.saturating_sub(w2));
        prop_assert_eq!(graph.weight(b, a), w2.saturating_sub(w1));
        prop_assert_eq!(graph.edge_count(), usize::from(w1 != w2));
    }

    // ===================================================================
    // INVARIANT 2: Loading never changes net positions and never keeps
    // both directions of a pair.
    // ===================================================================
    #[test]
    fn loading_conserves_net_positions(set in arb_obligation_set()) {
        let graph = WeightedDirectedGraph::from_obligations(&set).unwrap();
        let graph_ledger = Ledger::from_graph(&graph);
        let set_ledger = Ledger::from_obligations(&set);
        prop_assert_eq!(
            graph_ledger.non_zero(),
            set_ledger.non_zero()
        );
        prop_assert!(graph.total_weight() as u128 <= set.gross_total());
        for (from, to, weight) in graph.edges() {
            prop_assert!(weight > 0);
            prop_assert_eq!(graph.weight(to, from), 0);
        }
    }

    // ===================================================================
    // INVARIANT 3: Netting a cycle subtracts the bottleneck from every hop,
    // removes at least one hop and keeps net positions.
    // ===================================================================
    #[test]
    fn net_loop_removes_bottleneck((nodes, weights) in arb_ring()) {
        let set: ObligationSet = (0..nodes.len())
            .map(|i| Obligation::new(nodes[i], nodes[(i + 1) % nodes.len()], weights[i]))
            .collect();
        let mut graph = WeightedDirectedGraph::from_obligations(&set).unwrap();
        let before = Ledger::from_graph(&graph);
        let mut cycle: Vec<_> = nodes.iter().map(|n| graph.node_id(n).unwrap()).collect();
        cycle.push(cycle[0]);
        let bottleneck = *weights.iter().min().unwrap();

        let netted = NettingEngine::net_loop(&mut graph, &cycle).unwrap().unwrap();

        prop_assert_eq!(netted.amount, bottleneck);
        prop_assert_eq!(netted.len(), nodes.len());
        for (i, hop) in cycle.windows(2).enumerate() {
            prop_assert_eq!(graph.weight(hop[0], hop[1]), weights[i] - bottleneck);
        }
        prop_assert!(graph.edge_count() < nodes.len());
        let after = Ledger::from_graph(&graph);
        prop_assert_eq!(after.non_zero(), before.non_zero());
    }

    // ===================================================================
    // INVARIANT 4: A run drains the graph, every unit of debt is either
    // netted in a cycle or written off by pruning, and no node is ever
    // on two paths at a tick boundary.
    // ===================================================================
    #[test]
    fn run_accounts_for_all_debt(set in arb_obligation_set(), seed in any::<u64>(), workers in 1usize..5) {
        let graph = WeightedDirectedGraph::from_obligations(&set).unwrap();
        let initial = graph.total_weight();
        let mut scheduler = WormScheduler::new(graph, config(workers, seed), Vec::<NettedCycle>::new()).unwrap();

        let mut end = None;
        while end.is_none() && scheduler.ticks() < 100_000 {
            end = scheduler.tick().unwrap();

            let mut seen = HashSet::new();
            for agent in scheduler.agents().iter() {
                for node in agent.path() {
                    prop_assert!(seen.insert(*node));
                    prop_assert_eq!(scheduler.ownership().owner(*node), Some(agent.id()));
                }
            }
            prop_assert_eq!(seen.len(), scheduler.ownership().len());
        }

        prop_assert_eq!(end, Some(RunEnd::Exhausted));
        let stats = scheduler.stats();
        prop_assert_eq!(stats.gross_netted() + stats.pruned_weight(), initial);
        let netted: u64 = scheduler.sink().iter().map(NettedCycle::gross_reduction).sum();
        prop_assert_eq!(netted, stats.gross_netted());
    }

    // ===================================================================
    // INVARIANT 5: Runs are deterministic for a fixed seed.
    // ===================================================================
    #[test]
    fn runs_are_deterministic(set in arb_obligation_set(), seed in any::<u64>()) {
        let run = || {
            let graph = WeightedDirectedGraph::from_obligations(&set).unwrap();
            let mut scheduler = WormScheduler::new(graph, config(3, seed), Vec::<NettedCycle>::new()).unwrap();
            let end = scheduler.run().unwrap();
            let residual: HashMap<String, u64> = scheduler
                .graph()
                .to_obligations()
                .obligations()
                .iter()
                .map(|o| (format!("{}>{}", o.debtor(), o.creditor()), o.amount()))
                .collect();
            let ticks = scheduler.ticks();
            let (_, cycles) = scheduler.into_parts();
            (end, ticks, cycles, residual)
        };
        prop_assert_eq!(run(), run());
    }

    // ===================================================================
    // INVARIANT 6: A single worm spawned at the first node always
    // terminates and reproduces the same cycle stream.
    // ===================================================================
    #[test]
    fn single_worm_from_first_node_terminates(set in arb_obligation_set()) {
        let run = || {
            let graph = WeightedDirectedGraph::from_obligations(&set).unwrap();
            let first = graph.first_node();
            let mut scheduler = WormScheduler::new(graph, config(1, 0), Vec::<NettedCycle>::new()).unwrap();
            if let Some(node) = first {
                if scheduler.graph().has_outgoing_links(node) {
                    scheduler.spawn_at(node).unwrap();
                }
            }
            let end = scheduler.run().unwrap();
            (end, scheduler.into_parts().1)
        };
        let (end, cycles) = run();
        prop_assert_eq!(end, RunEnd::Exhausted);
        prop_assert_eq!(run().1, cycles);
    }
}

use crate::core::error::{GraphExhausted, Result};
use crate::core::node::NodeId;
use crate::core::obligation::{amount_overflow, Obligation, ObligationSet};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// A directed graph of positive integer debts between nodes.
///
/// Each edge `(from, to, w)` means `from` owes `to` the amount `w`. There is
/// at most one edge per ordered pair, and a weight never sits at zero: an edge
/// that reaches zero is removed. A node belongs to the graph only while it is
/// the endpoint of at least one edge, so the graph is exhausted exactly when
/// there is nothing left to net.
///
/// Traversal always takes the first outgoing neighbor of a node. Neighbors
/// stay in edge insertion order and nodes in the order they joined the
/// graph, also across removals, so for a given sequence of mutations the
/// choice is fully deterministic.
///
/// # Examples
///
/// ```
/// use worm_netting::graph::weighted_graph::WeightedDirectedGraph;
///
/// let mut graph = WeightedDirectedGraph::new();
/// let a = graph.intern("A");
/// let b = graph.intern("B");
///
/// graph.add_weight(a, b, 10).unwrap();
/// let netted = graph.add_weight(b, a, 4).unwrap();
///
/// assert_eq!(netted, 4);
/// assert_eq!(graph.weight(a, b), 6);
/// assert_eq!(graph.weight(b, a), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeightedDirectedGraph {
    graph: DiGraphMap<NodeId, u64>,
    /// `DiGraphMap` swap-removes, so traversal order is tracked here:
    /// outgoing neighbors per node in edge insertion order
    outgoing: HashMap<NodeId, Vec<NodeId>>,
    /// Live nodes in the order they joined the graph
    order: Vec<NodeId>,
    /// Interned node names, indexed by `NodeId`
    names: Vec<String>,
    ids: HashMap<String, NodeId>,
}

impl WeightedDirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a raw obligation list.
    ///
    /// Duplicate pairs are summed first, then every aggregated pair is added
    /// through [`add_weight`](Self::add_weight) in first-seen order, so
    /// mutual debts are netted bilaterally on load. Fails when the total debt
    /// does not fit in a `u64`.
    pub fn from_obligations(set: &ObligationSet) -> Result<Self> {
        let mut graph = Self::new();
        for ob in set.aggregate()? {
            let from = graph.intern(ob.debtor());
            let to = graph.intern(ob.creditor());
            graph.add_weight(from, to, ob.amount())?;
        }
        Ok(graph)
    }

    /// Get the id for a node name, registering the name if it is new.
    ///
    /// Registering a name does not add the node to the node set; it joins
    /// the graph once an edge touches it.
    pub fn intern(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = NodeId::new(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Look up the id of a known node name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    /// Resolve a node id back to its name.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this graph's [`intern`](Self::intern).
    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id.index()]
    }

    /// Add `amount` to the edge `from -> to`, netting it against `to -> from`.
    ///
    /// If the reverse edge carries weight, the smaller of the two directions is
    /// subtracted from both and the side that reaches zero is removed. Returns
    /// the amount cancelled by that netting, or 0 when there was no reverse
    /// edge. A self edge cancels itself entirely and is never stored.
    ///
    /// Fails with [`EngineError::AmountOverflow`](crate::core::error::EngineError::AmountOverflow)
    /// if the edge would exceed `u64::MAX`; the graph is left untouched.
    pub fn add_weight(&mut self, from: NodeId, to: NodeId, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Ok(0);
        }
        if from == to {
            return Ok(amount);
        }

        let reverse = self.weight(to, from);
        let forward = self
            .weight(from, to)
            .checked_add(amount)
            .ok_or_else(|| amount_overflow(self.name(from), self.name(to)))?;
        if reverse == 0 {
            self.set_weight(from, to, forward);
            return Ok(0);
        }

        let netted = forward.min(reverse);
        self.set_weight(from, to, forward - netted);
        self.set_weight(to, from, reverse - netted);
        Ok(netted)
    }

    /// Delete the edge `from -> to` unconditionally.
    ///
    /// Returns the weight the edge carried, or `None` if there was no edge.
    /// The remaining neighbors of `from` keep their order.
    pub fn remove_link(&mut self, from: NodeId, to: NodeId) -> Option<u64> {
        let removed = self.graph.remove_edge(from, to)?;
        if let Some(neighbors) = self.outgoing.get_mut(&from) {
            neighbors.retain(|n| *n != to);
            if neighbors.is_empty() {
                self.outgoing.remove(&from);
            }
        }
        self.drop_if_isolated(from);
        self.drop_if_isolated(to);
        Some(removed)
    }

    /// Current weight of `from -> to`, 0 if there is no edge.
    pub fn weight(&self, from: NodeId, to: NodeId) -> u64 {
        self.graph.edge_weight(from, to).copied().unwrap_or(0)
    }

    /// The first outgoing neighbor of `node`, the traversal rule's only choice.
    pub fn first_outgoing_node(&self, node: NodeId) -> Option<NodeId> {
        self.outgoing
            .get(&node)
            .and_then(|neighbors| neighbors.first())
            .copied()
    }

    /// The earliest node still in the graph.
    pub fn first_node(&self) -> Option<NodeId> {
        self.order.first().copied()
    }

    /// A uniformly random node of the node set.
    pub fn pick_random_node<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> std::result::Result<NodeId, GraphExhausted> {
        self.pick_random_node_where(rng, |_| true)
            .and_then(|picked| picked.ok_or(GraphExhausted))
    }

    /// A uniformly random node among those accepted by `filter`.
    ///
    /// Fails with [`GraphExhausted`] when the graph has no nodes at all and
    /// returns `Ok(None)` when nodes remain but none passes the filter.
    pub fn pick_random_node_where<R, F>(
        &self,
        rng: &mut R,
        filter: F,
    ) -> std::result::Result<Option<NodeId>, GraphExhausted>
    where
        R: Rng + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        if self.is_empty() {
            return Err(GraphExhausted);
        }
        let candidates: Vec<NodeId> = self
            .order
            .iter()
            .copied()
            .filter(|n| filter(*n))
            .collect();
        Ok(candidates.choose(rng).copied())
    }

    pub fn outgoing_neighbour_names(&self, node: NodeId) -> Vec<&str> {
        self.outgoing
            .get(&node)
            .map(|neighbors| neighbors.iter().map(|n| self.name(*n)).collect())
            .unwrap_or_default()
    }

    pub fn has_outgoing_links(&self, node: NodeId) -> bool {
        self.first_outgoing_node(node).is_some()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.order.iter().map(|n| self.name(*n)).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when no nodes remain, i.e. there is nothing left to net.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Sum of all edge weights: the outstanding gross debt.
    pub fn total_weight(&self) -> u64 {
        self.graph.all_edges().map(|(_, _, w)| *w).sum()
    }

    /// All edges as `(from, to, weight)`, grouped by source node in
    /// traversal order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, u64)> + '_ {
        self.order.iter().flat_map(move |&from| {
            self.outgoing
                .get(&from)
                .into_iter()
                .flatten()
                .map(move |&to| (from, to, self.weight(from, to)))
        })
    }

    /// Remaining edges as an obligation list, in the input line format.
    pub fn to_obligations(&self) -> ObligationSet {
        self.edges()
            .map(|(from, to, w)| Obligation::new(self.name(from), self.name(to), w))
            .collect()
    }

    fn set_weight(&mut self, from: NodeId, to: NodeId, weight: u64) {
        if weight == 0 {
            self.remove_link(from, to);
        } else if let Some(w) = self.graph.edge_weight_mut(from, to) {
            *w = weight;
        } else {
            self.join(from);
            self.join(to);
            self.graph.add_edge(from, to, weight);
            self.outgoing.entry(from).or_default().push(to);
        }
    }

    fn join(&mut self, node: NodeId) {
        if !self.graph.contains_node(node) {
            self.graph.add_node(node);
            self.order.push(node);
        }
    }

    fn drop_if_isolated(&mut self, node: NodeId) {
        let isolated = !self.has_outgoing_links(node)
            && self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_none();
        if isolated && self.graph.remove_node(node) {
            self.order.retain(|n| *n != node);
        }
    }
}

pub mod weighted_graph;

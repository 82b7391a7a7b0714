pub mod cluster_graph;

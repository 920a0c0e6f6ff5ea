/// Holds the room records and the adjacency graph between them
pub mod structs;

/// Holds the hop-distance propagation run whenever the graph gains an edge
pub mod relaxation;

//! Session memory graph.
//!
//! Aggregates recurring errors across recent assistant session logs into a
//! deduplicated bipartite graph: session nodes, error-signature nodes, and
//! one "has_error" edge per occurrence.

mod builder;
mod graph;
mod node;

pub use builder::{build_graph, GraphBuildError, DEFAULT_WINDOW};
pub use graph::{GraphEdge, MemoryGraph, EDGE_HAS_ERROR};
pub use node::{normalize_message, GraphNode, ERROR_KEY_MAX_LEN};

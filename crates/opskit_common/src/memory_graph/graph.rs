//! Graph container and snapshot serialization.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::node::GraphNode;

/// Relation type carried by every edge in the graph.
pub const EDGE_HAS_ERROR: &str = "has_error";

/// Directed edge recording "session encountered error".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

impl GraphEdge {
    pub fn has_error(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            edge_type: EDGE_HAS_ERROR.to_string(),
        }
    }
}

/// Deduplicated session/error graph with insertion-ordered nodes.
///
/// Nodes are unique by identity; edges are a multiset, so a recurring
/// error keeps its recurrence count in the edge list rather than in
/// duplicate nodes.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    seen_ids: HashSet<String>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless its identity has already been seen. First
    /// write wins: a later duplicate is dropped without merging fields.
    /// Returns whether the node was inserted.
    pub fn insert_node(&mut self, node: GraphNode) -> bool {
        if self.seen_ids.insert(node.id().to_string()) {
            self.nodes.push(node);
            true
        } else {
            false
        }
    }

    /// Append an edge. Edges are never deduplicated.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Write the snapshot as pretty JSON, creating parent directories as
    /// needed. A destination failure is fatal and names the path.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory {}", parent.display())
                })?;
            }
        }
        let json =
            serde_json::to_string_pretty(self).context("failed to serialize memory graph")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write memory graph to {}", path.display()))?;
        Ok(())
    }

    /// Read a snapshot back from disk, rebuilding the identity set.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read memory graph from {}", path.display()))?;
        let mut graph: Self =
            serde_json::from_str(&json).context("failed to parse memory graph snapshot")?;
        graph.seen_ids = graph.nodes.iter().map(|n| n.id().to_string()).collect();
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_duplicate_node_is_dropped() {
        let mut graph = MemoryGraph::new();
        assert!(graph.insert_node(GraphNode::session("a")));
        assert!(!graph.insert_node(GraphNode::session("a")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_first_write_wins_keeps_earlier_label() {
        let mut graph = MemoryGraph::new();
        graph.insert_node(GraphNode::Error {
            id: "err:disk full".to_string(),
            label: "disk full".to_string(),
        });
        graph.insert_node(GraphNode::Error {
            id: "err:disk full".to_string(),
            label: "a different label".to_string(),
        });

        assert_eq!(graph.node_count(), 1);
        match &graph.nodes[0] {
            GraphNode::Error { label, .. } => assert_eq!(label, "disk full"),
            _ => panic!("expected error node"),
        }
    }

    #[test]
    fn test_edges_are_not_deduplicated() {
        let mut graph = MemoryGraph::new();
        graph.add_edge(GraphEdge::has_error("a", "err:disk full"));
        graph.add_edge(GraphEdge::has_error("a", "err:disk full"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_nodes_keep_insertion_order() {
        let mut graph = MemoryGraph::new();
        graph.insert_node(GraphNode::session("b"));
        graph.insert_node(GraphNode::error("late binding"));
        graph.insert_node(GraphNode::session("a"));

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["b", "err:late binding", "a"]);
    }

    #[test]
    fn test_save_creates_parent_dirs_and_round_trips() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("deeper").join("graph.json");

        let mut graph = MemoryGraph::new();
        graph.insert_node(GraphNode::session("a"));
        graph.insert_node(GraphNode::error("disk full"));
        graph.add_edge(GraphEdge::has_error("a", "err:disk full"));
        graph.save(&out).unwrap();

        let loaded = MemoryGraph::load(&out).unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.edge_count(), 1);
        assert_eq!(loaded.edges[0].edge_type, EDGE_HAS_ERROR);
    }

    #[test]
    fn test_loaded_graph_still_deduplicates() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("graph.json");

        let mut graph = MemoryGraph::new();
        graph.insert_node(GraphNode::session("a"));
        graph.save(&out).unwrap();

        let mut loaded = MemoryGraph::load(&out).unwrap();
        assert!(!loaded.insert_node(GraphNode::session("a")));
        assert_eq!(loaded.node_count(), 1);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("graph.json");

        let mut graph = MemoryGraph::new();
        graph.insert_node(GraphNode::session("a"));
        graph.insert_node(GraphNode::error("disk full"));
        graph.add_edge(GraphEdge::has_error("a", "err:disk full"));
        graph.save(&out).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(raw["nodes"][0]["type"], "session");
        assert_eq!(raw["nodes"][1]["type"], "error");
        assert_eq!(raw["nodes"][1]["label"], "disk full");
        assert_eq!(raw["edges"][0]["type"], "has_error");
        assert_eq!(raw["edges"][0]["from"], "a");
        assert_eq!(raw["edges"][0]["to"], "err:disk full");
    }
}

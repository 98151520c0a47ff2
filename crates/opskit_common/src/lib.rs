//! Opskit Common - diagnostic engine for the OpenCode Ops Kit
//!
//! Pattern-based extraction from unstructured assistant logs: the runbook
//! signature matcher and the session memory graph builder, plus the config
//! doctors and eval statistics the CLI wires together.

pub mod bench;
pub mod fallback_doctor;
pub mod filesystem;
pub mod memory_graph;
pub mod plugin_health;
pub mod runbook;

pub use memory_graph::{GraphEdge, GraphNode, MemoryGraph};
pub use runbook::{default_rules, scan_text, Rule, SignatureMatch};

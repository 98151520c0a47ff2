//! Log-to-graph builder.
//!
//! Scans a bounded window of recent session logs, extracts error
//! occurrences with a fixed pattern, and registers them in the graph.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

use super::graph::{GraphEdge, MemoryGraph};
use super::node::GraphNode;
use crate::filesystem::read_to_string_lossy;

/// Default number of most-recent log files to scan. Files beyond the
/// window are silently ignored so memory and snapshot size stay bounded
/// as the log directory grows.
pub const DEFAULT_WINDOW: usize = 200;

/// Locates ERROR lines and captures the text after `message=` up to the
/// next `code=`/`fatal` marker or end of content.
static ERROR_MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ERROR\s+.*message=(.+?)\s+(?:code=|fatal|$)").unwrap());

#[derive(Debug, Error)]
pub enum GraphBuildError {
    #[error("log directory {0} does not exist")]
    MissingLogDir(PathBuf),
    #[error("failed to list log directory {dir}: {source}")]
    ListLogDir {
        dir: PathBuf,
        source: std::io::Error,
    },
}

/// Build the session graph from the last `window` log files in `log_dir`.
///
/// A missing log directory is a precondition failure. An unreadable
/// individual file is skipped with a warning and the run continues; a
/// file with no extractable errors contributes only its session node.
pub fn build_graph(log_dir: &Path, window: usize) -> Result<MemoryGraph, GraphBuildError> {
    let files = select_log_files(log_dir, window)?;
    let mut graph = MemoryGraph::new();

    for path in files {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        // Idempotent: a rerun under the same session id is not duplicated.
        graph.insert_node(GraphNode::session(stem.clone()));

        let text = match read_to_string_lossy(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!("skipping unreadable log file {}: {}", path.display(), err);
                continue;
            }
        };

        for caps in ERROR_MESSAGE_RE.captures_iter(&text) {
            let node = GraphNode::error(&caps[1]);
            let error_id = node.id().to_string();
            graph.insert_node(node);
            graph.add_edge(GraphEdge::has_error(stem.clone(), error_id));
        }
    }

    Ok(graph)
}

/// List `*.log` files, sort by filename ascending, keep the last `window`.
fn select_log_files(log_dir: &Path, window: usize) -> Result<Vec<PathBuf>, GraphBuildError> {
    if !log_dir.is_dir() {
        return Err(GraphBuildError::MissingLogDir(log_dir.to_path_buf()));
    }
    let entries = fs::read_dir(log_dir).map_err(|source| GraphBuildError::ListLogDir {
        dir: log_dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map(|ext| ext == "log").unwrap_or(false)
        })
        .collect();
    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    if files.len() > window {
        files.drain(..files.len() - window);
    }
    Ok(files)
}

//! Graph node identities.

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of a normalized error key. Keeps node
/// identities stable and storage bounded regardless of log verbosity.
pub const ERROR_KEY_MAX_LEN: usize = 200;

/// A node in the session memory graph.
///
/// Identity is a pure function of the variant and its derived key: session
/// nodes are named after the log file, error nodes after the normalized
/// message text. The constructors enforce the derivation so a caller
/// cannot build an error node without a normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphNode {
    /// One assistant run, identified by its log file's base name.
    Session { id: String },
    /// A distinct error signature. Occurrences with identical normalized
    /// text collapse to the same node, even across sessions.
    Error { id: String, label: String },
}

impl GraphNode {
    /// Session node from an extension-stripped log file name.
    pub fn session(stem: impl Into<String>) -> Self {
        Self::Session { id: stem.into() }
    }

    /// Error node from a raw captured message. Identity is
    /// `"err:" + normalized key`; the label carries the bounded text for
    /// display.
    pub fn error(raw_message: &str) -> Self {
        let key = normalize_message(raw_message);
        Self::Error {
            id: format!("err:{key}"),
            label: key,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Session { id } => id,
            Self::Error { id, .. } => id,
        }
    }
}

/// Trim a captured error message and truncate it to its deduplication key.
pub fn normalize_message(raw: &str) -> String {
    raw.trim().chars().take(ERROR_KEY_MAX_LEN).collect()
}

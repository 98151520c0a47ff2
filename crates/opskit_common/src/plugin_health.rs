//! Plugin list health check for opencode.json.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Plugins with known unresolved issues, matched by prefix.
const KNOWN_BAD_PREFIXES: &[&str] = &["opencode-token-monitor@"];

/// Outcome of a plugin-list check.
#[derive(Debug, Clone)]
pub struct PluginReport {
    pub config_path: PathBuf,
    /// Declared plugins, in config order.
    pub plugins: Vec<String>,
    /// Duplicate entries, one per extra occurrence.
    pub duplicates: Vec<String>,
    /// Entries matching a known-bad prefix. Warned about, not fatal.
    pub known_bad: Vec<String>,
    pub problem: Option<String>,
}

impl PluginReport {
    pub fn is_ok(&self) -> bool {
        self.problem.is_none()
    }

    fn failed(config_path: PathBuf, problem: String) -> Self {
        Self {
            config_path,
            plugins: Vec::new(),
            duplicates: Vec::new(),
            known_bad: Vec::new(),
            problem: Some(problem),
        }
    }
}

/// Default opencode config location (`~/.config/opencode/opencode.json`).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opencode")
        .join("opencode.json")
}

/// Validate the `plugin` list in the given opencode.json.
pub fn check(config_path: &Path) -> PluginReport {
    if !config_path.exists() {
        return PluginReport::failed(
            config_path.to_path_buf(),
            format!("missing {}", config_path.display()),
        );
    }

    let data: Value = match fs::read_to_string(config_path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(data) => data,
        Err(err) => {
            return PluginReport::failed(
                config_path.to_path_buf(),
                format!("unreadable config {}: {}", config_path.display(), err),
            );
        }
    };

    // A config without a plugin field is a valid empty list.
    let raw = match data.get("plugin") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return PluginReport::failed(
                config_path.to_path_buf(),
                "plugin field is not a list".to_string(),
            );
        }
    };

    let mut plugins = Vec::new();
    for item in &raw {
        match item.as_str() {
            Some(name) => plugins.push(name.to_string()),
            None => {
                return PluginReport::failed(
                    config_path.to_path_buf(),
                    "plugin entries must be strings".to_string(),
                );
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for plugin in &plugins {
        if !seen.insert(plugin.clone()) {
            duplicates.push(plugin.clone());
        }
    }

    let known_bad: Vec<String> = plugins
        .iter()
        .filter(|p| KNOWN_BAD_PREFIXES.iter().any(|prefix| p.starts_with(prefix)))
        .cloned()
        .collect();

    let problem = if duplicates.is_empty() {
        None
    } else {
        Some(format!("duplicate plugins: {duplicates:?}"))
    };

    PluginReport {
        config_path: config_path.to_path_buf(),
        plugins,
        duplicates,
        known_bad,
        problem,
    }
}

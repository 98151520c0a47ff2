//! Fallback configuration doctor.
//!
//! Validates the rate-limit fallback model list the assistant consults
//! when the primary model is throttled. Every claim is backed by a
//! filesystem probe: candidates are checked in priority order and the
//! first one that exists is the one inspected.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// File name probed in each candidate location.
pub const FALLBACK_FILE: &str = "rate-limit-fallback.json";

/// Outcome of a fallback-config check.
#[derive(Debug, Clone)]
pub struct FallbackReport {
    /// Paths probed, in priority order.
    pub candidates: Vec<PathBuf>,
    /// First candidate that exists, if any.
    pub selected: Option<PathBuf>,
    /// Number of entries in `fallbackModels`.
    pub model_count: usize,
    /// Indexes of malformed entries in `fallbackModels`.
    pub invalid_indexes: Vec<usize>,
    /// What went wrong, when the check failed.
    pub problem: Option<String>,
}

impl FallbackReport {
    pub fn is_ok(&self) -> bool {
        self.problem.is_none()
    }

    fn failed(candidates: Vec<PathBuf>, selected: Option<PathBuf>, problem: String) -> Self {
        Self {
            candidates,
            selected,
            model_count: 0,
            invalid_indexes: Vec::new(),
            problem: Some(problem),
        }
    }
}

/// Candidate config locations, project-local first.
pub fn candidate_paths(cwd: &Path) -> Vec<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    let xdg = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));
    vec![
        cwd.join(".opencode").join(FALLBACK_FILE),
        cwd.join(FALLBACK_FILE),
        home.join(".opencode").join(FALLBACK_FILE),
        xdg.join("opencode").join(FALLBACK_FILE),
    ]
}

/// Check the first fallback config found among the candidates for `cwd`.
pub fn run(cwd: &Path) -> FallbackReport {
    check_candidates(candidate_paths(cwd))
}

fn check_candidates(candidates: Vec<PathBuf>) -> FallbackReport {
    let Some(selected) = candidates.iter().find(|p| p.exists()).cloned() else {
        return FallbackReport::failed(candidates, None, "no fallback config found".to_string());
    };

    let data: Value = match fs::read_to_string(&selected)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(data) => data,
        Err(err) => {
            let problem = format!("unreadable fallback config {}: {}", selected.display(), err);
            return FallbackReport::failed(candidates, Some(selected), problem);
        }
    };

    let models = data
        .get("fallbackModels")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if models.is_empty() {
        let problem = format!("fallbackModels empty in {}", selected.display());
        return FallbackReport::failed(candidates, Some(selected), problem);
    }

    let invalid_indexes: Vec<usize> = models
        .iter()
        .enumerate()
        .filter(|(_, entry)| !is_valid_model(entry))
        .map(|(i, _)| i)
        .collect();
    let problem = if invalid_indexes.is_empty() {
        None
    } else {
        Some(format!(
            "invalid fallback entries at indexes {:?} in {}",
            invalid_indexes,
            selected.display()
        ))
    };

    FallbackReport {
        candidates,
        selected: Some(selected),
        model_count: models.len(),
        invalid_indexes,
        problem,
    }
}

/// A valid entry is an object with non-empty `providerID` and `modelID`.
fn is_valid_model(entry: &Value) -> bool {
    let non_empty = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    };
    entry.is_object() && non_empty("providerID") && non_empty("modelID")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let nested = dir.join(".opencode");
        fs::create_dir_all(&nested).unwrap();
        let path = nested.join(FALLBACK_FILE);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_no_config_found_lists_candidates() {
        let report = check_candidates(vec![PathBuf::from("/nonexistent/a"), PathBuf::from("/nonexistent/b")]);
        assert!(!report.is_ok());
        assert!(report.selected.is_none());
        assert_eq!(report.candidates.len(), 2);
    }

    #[test]
    fn test_valid_config_passes() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"fallbackModels": [{"providerID": "anthropic", "modelID": "claude-haiku-4-5"}]}"#,
        );

        let report = check_candidates(vec![path.clone()]);
        assert!(report.is_ok());
        assert_eq!(report.selected, Some(path));
        assert_eq!(report.model_count, 1);
    }

    #[test]
    fn test_empty_model_list_fails() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"fallbackModels": []}"#);

        let report = check_candidates(vec![path]);
        assert!(!report.is_ok());
        assert!(report.problem.unwrap().contains("fallbackModels empty"));
    }

    #[test]
    fn test_missing_field_counts_as_empty() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"other": 1}"#);

        let report = check_candidates(vec![path]);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_invalid_entries_report_indexes() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"fallbackModels": [
                {"providerID": "anthropic", "modelID": "claude-haiku-4-5"},
                {"providerID": ""},
                "not-an-object"
            ]}"#,
        );

        let report = check_candidates(vec![path]);
        assert!(!report.is_ok());
        assert_eq!(report.invalid_indexes, vec![1, 2]);
        assert_eq!(report.model_count, 3);
    }

    #[test]
    fn test_malformed_json_is_a_failed_check_not_a_panic() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "{ this is not json");

        let report = check_candidates(vec![path]);
        assert!(!report.is_ok());
        assert!(report.problem.unwrap().contains("unreadable fallback config"));
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempdir().unwrap();
        let first = write_config(
            dir.path(),
            r#"{"fallbackModels": [{"providerID": "anthropic", "modelID": "claude-haiku-4-5"}]}"#,
        );
        let second = dir.path().join(FALLBACK_FILE);
        fs::write(&second, r#"{"fallbackModels": []}"#).unwrap();

        let report = check_candidates(vec![first.clone(), second]);
        assert!(report.is_ok());
        assert_eq!(report.selected, Some(first));
    }

    #[test]
    fn test_candidate_paths_prefer_project_local() {
        let cwd = Path::new("/work/project");
        let candidates = candidate_paths(cwd);
        assert_eq!(candidates.len(), 4);
        assert_eq!(
            candidates[0],
            Path::new("/work/project/.opencode").join(FALLBACK_FILE)
        );
        assert_eq!(candidates[1], Path::new("/work/project").join(FALLBACK_FILE));
    }
}

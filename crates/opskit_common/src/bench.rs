//! Eval-harness statistics.
//!
//! Success and latency accounting for repeated smoke runs of the
//! assistant binary. The harness itself lives in the CLI; this module
//! owns the numbers so they stay testable without spawning anything.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Result of one timed run of the assistant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvalRun {
    pub ok: bool,
    pub latency_s: f64,
}

/// Aggregated outcome of an eval-harness invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalOutcome {
    /// Model under test, e.g. "anthropic/claude-haiku-4-5".
    pub model: String,
    /// ISO 8601 timestamp of the first run.
    pub started_at: String,
    pub runs: Vec<EvalRun>,
}

impl EvalOutcome {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            started_at: Utc::now().to_rfc3339(),
            runs: Vec::new(),
        }
    }

    pub fn record(&mut self, ok: bool, latency_s: f64) {
        self.runs.push(EvalRun { ok, latency_s });
    }

    pub fn successes(&self) -> usize {
        self.runs.iter().filter(|r| r.ok).count()
    }

    pub fn all_ok(&self) -> bool {
        self.successes() == self.runs.len()
    }

    pub fn latency_mean_s(&self) -> Option<f64> {
        if self.runs.is_empty() {
            return None;
        }
        let total: f64 = self.runs.iter().map(|r| r.latency_s).sum();
        Some(total / self.runs.len() as f64)
    }

    /// 95th-percentile latency over ascending samples. Index formula
    /// matches the original harness: `max(0, floor(n * 0.95) - 1)`.
    pub fn latency_p95_s(&self) -> Option<f64> {
        if self.runs.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.runs.iter().map(|r| r.latency_s).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = ((sorted.len() as f64 * 0.95) as usize).saturating_sub(1);
        Some(sorted[idx])
    }
}

//! Runbook signature matching.
//!
//! Holds an ordered catalog of (pattern, remediation) rules and scans raw
//! log text against all of them. The catalog is data handed in at call
//! time, never a hidden singleton, so new failure signatures can ship
//! without touching the matching logic.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A known failure signature paired with its remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Regex pattern, matched case-insensitively across line boundaries.
    pub pattern: String,
    /// Human-readable fix for logs matching this pattern.
    pub remediation: String,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            remediation: remediation.into(),
        }
    }
}

/// One rule that fired during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMatch {
    pub pattern: String,
    pub remediation: String,
}

/// Known opencode failure signatures, in triage order.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            r"fallbackModels is empty|No fallback models configured",
            "Create project-local rate-limit-fallback.json in .opencode/ and repo root.",
        ),
        Rule::new(
            r"Model not found: anthropic/haiku",
            "Replace with anthropic/claude-haiku-4-5.",
        ),
        Rule::new(
            r"Cannot find package 'react'.*zustand",
            "Upgrade/remove problematic plugin and retry with clean cache.",
        ),
        Rule::new(
            r"BunInstallFailedError|EBUSY",
            "Close concurrent opencode runs and retry once; lock contention on cache.",
        ),
        Rule::new(
            r"ENOENT: no such file or directory, mkdir.*opencode-token-monitor",
            "Disable opencode-token-monitor or switch analytics plugin.",
        ),
    ]
}

/// Scan `text` against every rule, preserving declared order.
///
/// Matching is case-insensitive and a pattern may match across line
/// boundaries, since signatures often span a log message and the
/// stack/metadata lines that follow it. Rules fire independently of one
/// another. An empty result means no known signature was recognized, not
/// a failed scan.
pub fn scan_text(text: &str, rules: &[Rule]) -> Vec<SignatureMatch> {
    let mut matches = Vec::new();
    for rule in rules {
        let re = match RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(re) => re,
            Err(err) => {
                warn!("skipping unparseable runbook rule '{}': {}", rule.pattern, err);
                continue;
            }
        };
        if re.is_match(text) {
            matches.push(SignatureMatch {
                pattern: rule.pattern.clone(),
                remediation: rule.remediation.clone(),
            });
        }
    }
    matches
}

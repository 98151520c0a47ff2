//! Subcommand implementations for opsctl.
//!
//! Each command prints its verdict lines and returns the process exit
//! code; a failed check is exit 1, an unexpected internal error bubbles
//! up as anyhow.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::warn;

use opskit_common::bench::EvalOutcome;
use opskit_common::memory_graph::GraphBuildError;

use crate::errors::{EXIT_CHECK_FAILED, EXIT_SUCCESS};

/// Per-run timeout for assistant smoke runs.
const EVAL_RUN_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for each proofcheck step.
const PROOFCHECK_TIMEOUT: Duration = Duration::from_secs(300);

/// Validate the rate-limit fallback configuration for the current project.
pub fn fallback_doctor() -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let report = opskit_common::fallback_doctor::run(&cwd);

    if let Some(problem) = &report.problem {
        println!("{}: {}", "FAIL".red(), problem);
        if report.selected.is_none() {
            for path in &report.candidates {
                println!("  - {}", path.display());
            }
        }
        return Ok(EXIT_CHECK_FAILED);
    }

    if let Some(selected) = &report.selected {
        println!("{}: fallback config {}", "OK".green(), selected.display());
    }
    println!("{}: fallbackModels count = {}", "OK".green(), report.model_count);
    Ok(EXIT_SUCCESS)
}

/// Check the plugin list in opencode.json.
pub fn plugin_health(config: Option<PathBuf>) -> Result<i32> {
    let path = config.unwrap_or_else(opskit_common::plugin_health::default_config_path);
    let report = opskit_common::plugin_health::check(&path);

    if let Some(problem) = &report.problem {
        println!("{}: {}", "FAIL".red(), problem);
        return Ok(EXIT_CHECK_FAILED);
    }

    if !report.known_bad.is_empty() {
        println!(
            "{}: opencode-token-monitor has known Windows ENOENT issues in this setup",
            "WARN".yellow()
        );
        for plugin in &report.known_bad {
            println!("  - {plugin}");
        }
    }
    println!(
        "{}: plugin list valid ({} entries)",
        "OK".green(),
        report.plugins.len()
    );
    Ok(EXIT_SUCCESS)
}

/// Grep a log file against the known failure signatures.
pub fn runbook(log: &Path) -> Result<i32> {
    if !log.exists() {
        println!("{}: missing log file {}", "FAIL".red(), log.display());
        return Ok(EXIT_CHECK_FAILED);
    }
    let text = opskit_common::filesystem::read_to_string_lossy(log)
        .with_context(|| format!("failed to read log file {}", log.display()))?;

    let rules = opskit_common::runbook::default_rules();
    let matches = opskit_common::runbook::scan_text(&text, &rules);
    if matches.is_empty() {
        // Zero findings is a successful scan, not a failure.
        println!("No known runbook signatures found.");
        return Ok(EXIT_SUCCESS);
    }
    for found in &matches {
        println!("{}: {}", "MATCH".yellow(), found.pattern);
        println!("FIX:   {}", found.remediation);
    }
    Ok(EXIT_SUCCESS)
}

/// Build the session memory graph from recent logs and write the snapshot.
pub fn memory_graph(log_dir: Option<PathBuf>, out: Option<PathBuf>, window: usize) -> Result<i32> {
    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    let out = out.unwrap_or_else(default_graph_path);

    let graph = match opskit_common::memory_graph::build_graph(&log_dir, window) {
        Ok(graph) => graph,
        Err(err @ GraphBuildError::MissingLogDir(_)) => {
            println!("{}: {}", "FAIL".red(), err);
            return Ok(EXIT_CHECK_FAILED);
        }
        Err(err) => return Err(err.into()),
    };
    graph.save(&out)?;

    println!(
        "{}: wrote {} with {} nodes and {} edges",
        "OK".green(),
        out.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(EXIT_SUCCESS)
}

/// Run the assistant `runs` times and report success rate and latency.
pub async fn eval_harness(model: &str, runs: usize, cwd: Option<PathBuf>) -> Result<i32> {
    let cwd = resolve_cwd(cwd)?;
    let mut outcome = EvalOutcome::new(model);

    for run in 1..=runs {
        let start = Instant::now();
        let result = tokio::time::timeout(
            EVAL_RUN_TIMEOUT,
            Command::new("opencode")
                .arg("run")
                .arg("Reply exactly with OK")
                .arg(format!("--model={model}"))
                .current_dir(&cwd)
                .kill_on_drop(true)
                .output(),
        )
        .await;
        let elapsed = start.elapsed().as_secs_f64();

        let ok = match result {
            Ok(Ok(output)) => {
                let combined = format!(
                    "{}\n{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                );
                output.status.success() && combined.contains("OK")
            }
            Ok(Err(err)) => {
                warn!("run {run}: failed to spawn opencode: {err}");
                false
            }
            Err(_) => {
                warn!("run {run}: timed out after {}s", EVAL_RUN_TIMEOUT.as_secs());
                false
            }
        };
        if !ok {
            println!("run {run}: {}", "FAIL".red());
        }
        outcome.record(ok, elapsed);
    }

    println!("success_rate={}/{}", outcome.successes(), runs);
    if let Some(mean) = outcome.latency_mean_s() {
        println!("latency_mean_s={mean:.2}");
    }
    if let Some(p95) = outcome.latency_p95_s() {
        println!("latency_p95_s={p95:.2}");
    }
    Ok(if outcome.all_ok() { EXIT_SUCCESS } else { EXIT_CHECK_FAILED })
}

/// Run repository proof checks: git status plus the test command.
pub async fn proofcheck(cwd: Option<PathBuf>, test_cmd: String) -> Result<i32> {
    let cwd = resolve_cwd(cwd)?;
    let mut exit_code = EXIT_SUCCESS;

    match run_check(&cwd, &["git", "status", "--short"], PROOFCHECK_TIMEOUT).await {
        Ok(output) => {
            println!("[git_status] exit={}", output.status.code().unwrap_or(-1));
            if output.status.success() {
                let changed = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .count();
                println!("[git_status] changed_files={changed}");
            }
        }
        Err(err) => println!("[git_status] error={err}"),
    }

    let parts: Vec<&str> = test_cmd.split_whitespace().collect();
    if parts.is_empty() {
        println!("[tests] error=empty test command");
        return Ok(EXIT_CHECK_FAILED);
    }
    match run_check(&cwd, &parts, PROOFCHECK_TIMEOUT).await {
        Ok(output) => {
            println!("[tests] exit={}", output.status.code().unwrap_or(-1));
            if !output.status.success() {
                exit_code = EXIT_CHECK_FAILED;
            }
        }
        Err(err) => {
            println!("[tests] error={err}");
            exit_code = EXIT_CHECK_FAILED;
        }
    }

    Ok(exit_code)
}

/// Run one check command with a timeout. The child is killed when the
/// timeout drops the pending output future, so a hung command cannot
/// outlive the invocation.
async fn run_check(cwd: &Path, argv: &[&str], timeout: Duration) -> Result<Output> {
    let (program, args) = argv.split_first().context("empty check command")?;
    let output = tokio::time::timeout(
        timeout,
        Command::new(program)
            .args(args)
            .current_dir(cwd)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| anyhow::anyhow!("timed out after {}s", timeout.as_secs()))?
    .with_context(|| format!("failed to run {program}"))?;
    Ok(output)
}

fn resolve_cwd(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("failed to resolve current directory"),
    }
}

/// Default assistant log directory (`~/.local/share/opencode/log`).
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opencode")
        .join("log")
}

/// Default snapshot path (`~/.local/share/opencode/memory-graph.json`).
pub fn default_graph_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opencode")
        .join("memory-graph.json")
}

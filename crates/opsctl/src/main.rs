//! OpenCode Ops Kit - operational diagnostics CLI
//!
//! Inspects assistant configuration files, greps session logs for known
//! failure signatures, and builds the session memory graph.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use opsctl::commands;

#[derive(Parser)]
#[command(name = "opsctl")]
#[command(about = "OpenCode Ops Kit - assistant diagnostics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the rate-limit fallback configuration
    FallbackDoctor,

    /// Check the plugin list in opencode.json
    PluginHealth {
        /// Path to opencode.json (default: ~/.config/opencode/opencode.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grep a log file against known failure signatures
    Runbook {
        /// Log file to scan
        #[arg(long)]
        log: PathBuf,
    },

    /// Repeated smoke runs of the assistant with latency stats
    EvalHarness {
        /// Model to exercise
        #[arg(long, default_value = "anthropic/claude-haiku-4-5")]
        model: String,

        /// Number of runs
        #[arg(long, default_value_t = 3)]
        runs: usize,

        /// Working directory for the assistant
        #[arg(long)]
        cwd: Option<PathBuf>,
    },

    /// Run repository proof checks (git status + tests)
    Proofcheck {
        /// Directory to check
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Test command to run
        #[arg(long, default_value = "bun test")]
        test_cmd: String,
    },

    /// Build the session memory graph from recent logs
    MemoryGraph {
        /// Log directory to scan (default: ~/.local/share/opencode/log)
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Snapshot output path (default: ~/.local/share/opencode/memory-graph.json)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Most-recent log files to consider
        #[arg(long, default_value_t = opskit_common::memory_graph::DEFAULT_WINDOW)]
        window: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::FallbackDoctor => commands::fallback_doctor()?,
        Commands::PluginHealth { config } => commands::plugin_health(config)?,
        Commands::Runbook { log } => commands::runbook(&log)?,
        Commands::EvalHarness { model, runs, cwd } => {
            commands::eval_harness(&model, runs, cwd).await?
        }
        Commands::Proofcheck { cwd, test_cmd } => commands::proofcheck(cwd, test_cmd).await?,
        Commands::MemoryGraph { log_dir, out, window } => {
            commands::memory_graph(log_dir, out, window)?
        }
    };
    std::process::exit(exit_code);
}

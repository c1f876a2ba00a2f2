// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod format;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::resolve;
use crate::exec::ShellBackend;
use crate::pipeline::{Orchestrator, RunSummary};
use crate::report::Sinks;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (CLI flags over an optional TOML file)
/// - the output sinks (stdout/stderr plus optional JSON-lines files)
/// - the shell process backend
/// - the pipeline orchestrator reading from stdin
pub async fn run(args: CliArgs) -> Result<RunSummary> {
    let config = resolve(&args)?;
    debug!(?config, "resolved configuration");

    if config.options.dry_run {
        info!(exec = %config.options.command, "dry-run: no commands will be executed");
    }

    let sinks = Sinks::open(&config.sinks).await?;
    let orchestrator = Orchestrator::new(
        Arc::new(config.options),
        ShellBackend::new(),
        tokio::io::stdin(),
        sinks,
    );

    Ok(orchestrator.run().await?)
}

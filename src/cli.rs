// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Flags left unset fall back to the optional `--config` file, then to the
//! built-in defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawConfig;

/// Command-line arguments for `streamexec`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "streamexec",
    version,
    about = "Run a command once per newline-delimited JSON object read from stdin.",
    long_about = "Each JSON object on stdin becomes the environment of one run of --exec. \
                  Runs happen concurrently; results go to stdout, failures to stderr."
)]
pub struct CliArgs {
    /// The shell command to run for every record.
    #[arg(long = "exec", value_name = "CMD")]
    pub exec: Option<String>,

    /// Number of concurrent workers (default 10).
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Additional attempts after a failed run (default 0).
    #[arg(long, value_name = "R")]
    pub retries: Option<u32>,

    /// Base delay of the linear backoff between retries (default 1000).
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Capacity of the record queue (default 5000).
    #[arg(long, value_name = "N")]
    pub buffer_size: Option<usize>,

    /// Keep going after a failed run or a bad record.
    #[arg(long = "continue")]
    pub continue_on_error: bool,

    /// Show what would run without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print environments and commands alongside results.
    #[arg(long)]
    pub debug: bool,

    /// Append structured (JSON lines) results to this file.
    #[arg(long, value_name = "PATH")]
    pub output_log_path: Option<PathBuf>,

    /// Append structured (JSON lines) failures and errors to this file.
    #[arg(long = "err-log-path", value_name = "PATH")]
    pub err_log_path: Option<PathBuf>,

    /// Optional TOML file providing any of the settings above.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `--debug`, `STREAMEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Overlay every flag that was actually given onto `raw`.
    pub fn apply_to(&self, raw: &mut RawConfig) {
        if let Some(exec) = &self.exec {
            raw.exec = Some(exec.clone());
        }
        if let Some(n) = self.concurrency {
            raw.concurrency = n;
        }
        if let Some(r) = self.retries {
            raw.retries = r;
        }
        if let Some(ms) = self.retry_delay_ms {
            raw.retry_delay_ms = ms;
        }
        if let Some(n) = self.buffer_size {
            raw.buffer_size = n;
        }
        raw.continue_on_error |= self.continue_on_error;
        raw.dry_run |= self.dry_run;
        raw.debug |= self.debug;
        if let Some(path) = &self.output_log_path {
            raw.output_log_path = Some(path.clone());
        }
        if let Some(path) = &self.err_log_path {
            raw.err_log_path = Some(path.clone());
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

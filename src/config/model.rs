// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::Params;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_BUFFER_SIZE: usize = 5000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Configuration as read from an optional TOML file, before CLI overrides.
///
/// ```toml
/// exec = "curl -s \"https://example.com/users/$id\""
/// concurrency = 4
/// retries = 2
/// retry_delay_ms = 500
/// continue_on_error = true
/// output_log_path = "results.jsonl"
/// err_log_path = "errors.jsonl"
/// ```
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Shell command run once per record.
    pub exec: Option<String>,
    pub concurrency: usize,
    /// Additional attempts after a failed run (0 = run once).
    pub retries: u32,
    /// Base of the linear backoff between retries.
    pub retry_delay_ms: u64,
    /// Capacity of the record queue between the reader and the workers.
    pub buffer_size: usize,
    pub continue_on_error: bool,
    pub debug: bool,
    pub dry_run: bool,
    /// Structured (JSON lines) output for successful results.
    pub output_log_path: Option<PathBuf>,
    /// Structured (JSON lines) output for failures and errors.
    pub err_log_path: Option<PathBuf>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            exec: None,
            concurrency: DEFAULT_CONCURRENCY,
            retries: 0,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            continue_on_error: false,
            debug: false,
            dry_run: false,
            output_log_path: None,
            err_log_path: None,
        }
    }
}

/// Immutable per-run settings shared (behind an `Arc`) by every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub command: String,
    pub concurrency: usize,
    pub retries: u32,
    pub retry_delay: Duration,
    pub buffer_size: usize,
    pub continue_on_error: bool,
    pub debug: bool,
    pub dry_run: bool,
}

impl ExecutionOptions {
    /// Options for `command` with every other setting at its default.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            concurrency: DEFAULT_CONCURRENCY,
            retries: 0,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            buffer_size: DEFAULT_BUFFER_SIZE,
            continue_on_error: false,
            debug: false,
            dry_run: false,
        }
    }

    pub fn params(&self) -> Params {
        Params {
            exec_string: self.command.clone(),
        }
    }
}

/// Where the structured sinks write to, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkPaths {
    pub output_log: Option<PathBuf>,
    pub error_log: Option<PathBuf>,
}

/// Validated configuration: execution options plus sink locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub options: ExecutionOptions,
    pub sinks: SinkPaths,
}

impl ResolvedConfig {
    /// Build without validation. Use `ResolvedConfig::try_from(raw)` instead.
    pub(crate) fn new_unchecked(raw: RawConfig, command: String) -> Self {
        Self {
            options: ExecutionOptions {
                command,
                concurrency: raw.concurrency,
                retries: raw.retries,
                retry_delay: Duration::from_millis(raw.retry_delay_ms),
                buffer_size: raw.buffer_size,
                continue_on_error: raw.continue_on_error,
                debug: raw.debug,
                dry_run: raw.dry_run,
            },
            sinks: SinkPaths {
                output_log: raw.output_log_path,
                error_log: raw.err_log_path,
            },
        }
    }
}

// src/exec/retry.rs

//! Retry-with-backoff around a [`ProcessBackend`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ExecutionOptions;
use crate::errors::Result;
use crate::exec::backend::{ProcessBackend, ProcessOutput};
use crate::types::ExecutionResult;

/// Linear backoff: the delay before retry `k` is `base * k`.
///
/// `base` is clamped to at least one millisecond so consecutive delays always
/// grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    pub fn linear(base: Duration) -> Self {
        Self {
            base: base.max(Duration::from_millis(1)),
        }
    }

    /// Delay to wait before the `retry`-th retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base.saturating_mul(retry.max(1))
    }
}

/// Runs the configured command for one record, retrying non-zero exits.
pub struct RetryingExecutor<B> {
    backend: B,
    options: Arc<ExecutionOptions>,
    backoff: Backoff,
    shutdown: CancellationToken,
}

impl<B: ProcessBackend> RetryingExecutor<B> {
    pub fn new(backend: B, options: Arc<ExecutionOptions>, shutdown: CancellationToken) -> Self {
        let backoff = Backoff::linear(options.retry_delay);
        Self {
            backend,
            options,
            backoff,
            shutdown,
        }
    }

    /// Run the command with `envvars` as its environment.
    ///
    /// - `Ok(Some(result))`: the command ran; `result.succeeded` tells how the
    ///   final attempt went. At most `retries + 1` attempts are made.
    /// - `Ok(None)`: dry-run, nothing was executed.
    /// - `Err(_)`: the command could not be launched. Not retried.
    ///
    /// A pending backoff sleep ends early when shutdown is requested; the last
    /// failure is then returned as-is.
    pub async fn execute(&self, envvars: Vec<String>) -> Result<Option<ExecutionResult>> {
        let command = self.options.command.as_str();

        if self.options.dry_run {
            if self.options.debug {
                debug!(exec = %command, envvars = ?envvars, "dry-run: sh -c would run");
            }
            return Ok(None);
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let output = self.backend.run(command, &envvars).await?;

            if output.success() || attempt > self.options.retries {
                return Ok(Some(self.finish(envvars, output, attempt)));
            }

            let delay = self.backoff.delay_for(attempt);
            debug!(
                attempt,
                exit_code = output.exit_code,
                delay_ms = delay.as_millis() as u64,
                "command failed; retrying after backoff"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.cancelled() => {
                    info!(attempt, "shutdown requested during backoff; giving up on retries");
                    return Ok(Some(self.finish(envvars, output, attempt)));
                }
            }
        }
    }

    fn finish(&self, envvars: Vec<String>, output: ProcessOutput, attempts: u32) -> ExecutionResult {
        ExecutionResult {
            envvars,
            params: self.options.params(),
            succeeded: output.success(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            attempts,
        }
    }
}

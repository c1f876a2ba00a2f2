// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The retrying executor talks to a `ProcessBackend` instead of spawning
//! processes directly. This makes it easy to swap in a scripted backend in
//! tests while keeping the production implementation in [`super::shell`].

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

/// What one finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait abstracting how a command is run once with a given environment.
///
/// Production code uses [`super::ShellBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessBackend: Send + Sync {
    /// Run `command` with exactly `env` (a list of `KEY=VALUE` strings) as its
    /// environment and wait for it to exit.
    ///
    /// A process that starts and exits non-zero is an `Ok` output. An `Err`
    /// means the process could not be run at all
    /// ([`crate::errors::StreamExecError::Launch`]).
    fn run<'a>(
        &'a self,
        command: &'a str,
        env: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>>;
}

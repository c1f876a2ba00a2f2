// src/report/mod.rs

//! Fan-in of results and errors from every worker into one writer.
//!
//! - [`render`] turns results/errors into human text or JSON lines.
//! - [`sink`] wraps the output targets and makes closing idempotent.
//! - [`reporter`] is the single task that owns and writes every sink, and
//!   decides when a failure halts the run.

pub mod render;
pub mod reporter;
pub mod sink;

use crate::errors::StreamExecError;
use crate::types::ExecutionResult;

pub use render::TextRenderer;
pub use reporter::{Reporter, ReporterOutcome};
pub use sink::{Sink, Sinks};

/// What a worker hands to the reporter for one record.
#[derive(Debug)]
pub enum Report {
    /// The command ran (successfully or not).
    Result(ExecutionResult),
    /// The record could not be run at all.
    Error(StreamExecError),
}

/// Tally kept by the reporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: usize,
    pub sink_errors: usize,
}

impl ReportStats {
    /// Results and errors seen, one per record.
    pub fn reported(&self) -> usize {
        self.succeeded + self.failed + self.errors
    }
}

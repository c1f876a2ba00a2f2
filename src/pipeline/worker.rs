// src/pipeline/worker.rs

//! Worker loop and the per-record processing path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::StreamExecError;
use crate::exec::{ProcessBackend, RetryingExecutor};
use crate::format::format_env;
use crate::pipeline::queue::RecordReceiver;
use crate::report::Report;
use crate::types::Record;

/// Format → execute for one record. Shared by every worker and by the
/// orchestrator's drain pass.
pub struct RecordHandler<B> {
    executor: RetryingExecutor<B>,
}

impl<B: ProcessBackend> RecordHandler<B> {
    pub fn new(executor: RetryingExecutor<B>) -> Self {
        Self { executor }
    }

    /// Produce the report for `record`, or `None` when nothing is reported
    /// (dry-run).
    pub async fn process(&self, record: Record) -> Option<Report> {
        let envvars = match format_env(&record) {
            Ok(envvars) => envvars,
            Err(source) => {
                debug!(error = %source, "record is not a JSON object");
                return Some(Report::Error(StreamExecError::Parse { record, source }));
            }
        };

        match self.executor.execute(envvars).await {
            Ok(Some(result)) => Some(Report::Result(result)),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "command could not be launched");
                Some(Report::Error(err))
            }
        }
    }
}

/// One member of the worker pool.
pub struct Worker<B> {
    id: usize,
    records: RecordReceiver,
    handler: Arc<RecordHandler<B>>,
    reports: mpsc::Sender<Report>,
    shutdown: CancellationToken,
}

impl<B: ProcessBackend> Worker<B> {
    pub fn new(
        id: usize,
        records: RecordReceiver,
        handler: Arc<RecordHandler<B>>,
        reports: mpsc::Sender<Report>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            records,
            handler,
            reports,
            shutdown,
        }
    }

    /// Take records until the queue is closed and empty, or shutdown fires.
    ///
    /// A record already taken is always run to completion; its report is
    /// dropped if the reporter has stopped. Returns how many records this
    /// worker took.
    pub async fn run(self) -> usize {
        let mut taken = 0usize;
        debug!(worker = self.id, "worker started");

        loop {
            let record = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(worker = self.id, "shutdown requested; worker stopping");
                    break;
                }
                record = self.records.recv() => match record {
                    Some(r) => r,
                    None => break,
                },
            };
            taken += 1;

            let Some(report) = self.handler.process(record).await else {
                continue;
            };
            if self.reports.send(report).await.is_err() {
                debug!(worker = self.id, "reporter gone; dropping report and stopping");
                break;
            }
        }

        debug!(worker = self.id, taken, "worker finished");
        taken
    }
}

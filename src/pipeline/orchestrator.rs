// src/pipeline/orchestrator.rs

//! Lifecycle of a run: start every task, wait, drain, shut down.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ExecutionOptions;
use crate::errors::{Result, StreamExecError};
use crate::exec::{ProcessBackend, RetryingExecutor};
use crate::input::read_records;
use crate::pipeline::queue::record_queue;
use crate::pipeline::worker::{RecordHandler, Worker};
use crate::report::{Report, ReportStats, Reporter, ReporterOutcome, Sinks, TextRenderer};

/// Reports in flight between the workers and the reporter.
const REPORT_CHANNEL_CAPACITY: usize = 256;

/// Phases of a run, in order. A fatal halt skips `Draining`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    Running,
    Draining,
    ShuttingDown,
    Terminated,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Records handed to the queue by the reader.
    pub records: usize,
    /// Records processed by the drain pass instead of a worker.
    pub drained: usize,
    pub stats: ReportStats,
    /// Reading the input failed.
    pub input_failed: bool,
    /// The run was halted (by a failure without continue-on-error, or by an
    /// input failure).
    pub fatal: bool,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.fatal { 1 } else { 0 }
    }
}

/// Owns the pieces of a run until [`Orchestrator::run`] wires them together.
pub struct Orchestrator<B, R> {
    options: Arc<ExecutionOptions>,
    backend: B,
    input: R,
    sinks: Sinks,
    renderer: TextRenderer,
}

impl<B, R> Orchestrator<B, R>
where
    B: ProcessBackend + 'static,
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(options: Arc<ExecutionOptions>, backend: B, input: R, sinks: Sinks) -> Self {
        let renderer = TextRenderer::new(options.debug);
        Self {
            options,
            backend,
            input,
            sinks,
            renderer,
        }
    }

    /// Replace the human renderer (e.g. to force plain output).
    pub fn with_renderer(mut self, renderer: TextRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Run the pipeline to completion or to a fatal halt.
    ///
    /// Sinks are always closed before this returns. After a fatal halt it
    /// returns without waiting for commands that are still running.
    pub async fn run(self) -> Result<RunSummary> {
        let Orchestrator {
            options,
            backend,
            input,
            sinks,
            renderer,
        } = self;
        let mut phase = Phase::Idle;

        let shutdown = CancellationToken::new();
        let handler = Arc::new(RecordHandler::new(RetryingExecutor::new(
            backend,
            options.clone(),
            shutdown.clone(),
        )));

        // Idle → Running: reporter, reader, workers.
        advance(&mut phase, Phase::Running);
        let (record_tx, record_rx) = record_queue(options.buffer_size);
        let (report_tx, report_rx) = mpsc::channel::<Report>(REPORT_CHANNEL_CAPACITY);
        let enqueued = Arc::new(AtomicUsize::new(0));

        let reporter = tokio::spawn(
            Reporter::new(sinks, renderer, options.continue_on_error, shutdown.clone())
                .run(report_rx),
        );
        let mut reader = tokio::spawn(read_records(
            input,
            record_tx,
            shutdown.clone(),
            enqueued.clone(),
        ));
        let mut workers = JoinSet::new();
        for id in 0..options.concurrency {
            workers.spawn(
                Worker::new(
                    id,
                    record_rx.clone(),
                    handler.clone(),
                    report_tx.clone(),
                    shutdown.clone(),
                )
                .run(),
            );
        }
        info!(
            workers = options.concurrency,
            buffer = options.buffer_size,
            "pipeline running"
        );

        let mut input_failed = false;
        let read = tokio::select! {
            joined = &mut reader => Some(joined),
            _ = shutdown.cancelled() => None,
        };
        match read {
            Some(Ok(Ok(()))) => debug!("input exhausted; waiting for workers"),
            Some(Ok(Err(err))) => {
                error!(error = %err, "input stream failed; aborting run");
                input_failed = true;
                if report_tx.send(Report::Error(err)).await.is_err() {
                    debug!("reporter already stopped; input error not reported");
                }
                shutdown.cancel();
            }
            Some(Err(join_err)) => {
                error!(error = %join_err, "input reader task failed; aborting run");
                input_failed = true;
                shutdown.cancel();
            }
            None => reader.abort(),
        }

        let mut taken = 0usize;
        if !shutdown.is_cancelled() {
            tokio::select! {
                _ = join_workers(&mut workers, &mut taken) => {}
                _ = shutdown.cancelled() => {}
            }
        }

        // Running → Draining: only on a clean end of input.
        let mut drained = 0usize;
        if !shutdown.is_cancelled() {
            advance(&mut phase, Phase::Draining);
            while let Some(record) = record_rx.try_next().await {
                if shutdown.is_cancelled() {
                    break;
                }
                drained += 1;
                let Some(report) = handler.process(record).await else {
                    continue;
                };
                if report_tx.send(report).await.is_err() {
                    break;
                }
            }
            if drained > 0 {
                info!(drained, "drained records left in the queue");
            }
        }

        // → ShuttingDown: no more reports, close sinks, reap tasks.
        advance(&mut phase, Phase::ShuttingDown);
        drop(report_tx);
        let ReporterOutcome {
            mut sinks,
            mut stats,
            fatal,
        } = reporter
            .await
            .map_err(|e| StreamExecError::Other(anyhow!("reporter task failed: {e}")))?;
        stats.sink_errors += sinks.close_all().await;
        let fatal = fatal || input_failed;

        if fatal {
            // Commands still running are neither awaited nor killed (aborting
            // a worker would drop its child). Their reports are lost.
            if !workers.is_empty() {
                warn!(
                    workers = workers.len(),
                    "fatal halt; leaving in-flight commands unreported"
                );
            }
            workers.detach_all();
        } else {
            join_workers(&mut workers, &mut taken).await;
        }
        if !reader.is_finished() {
            reader.abort();
        }

        advance(&mut phase, Phase::Terminated);
        let summary = RunSummary {
            records: enqueued.load(Ordering::SeqCst),
            drained,
            stats,
            input_failed,
            fatal,
        };
        info!(
            records = summary.records,
            taken,
            succeeded = stats.succeeded,
            failed = stats.failed,
            errors = stats.errors,
            sink_errors = stats.sink_errors,
            fatal,
            "run finished"
        );
        Ok(summary)
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    debug_assert!(next > *phase, "phase must move forward: {phase:?} -> {next:?}");
    debug!(from = ?*phase, to = ?next, "pipeline phase change");
    *phase = next;
}

async fn join_workers(workers: &mut JoinSet<usize>, taken: &mut usize) {
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(n) => *taken += n,
            Err(e) => warn!(error = %e, "worker task failed"),
        }
    }
}

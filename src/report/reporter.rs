// src/report/reporter.rs

//! The single writer of every sink.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::report::render::{structured_error, structured_result, TextRenderer};
use crate::report::sink::{Sink, Sinks};
use crate::report::{Report, ReportStats};

/// What the reporter hands back to the orchestrator when it stops.
#[derive(Debug)]
pub struct ReporterOutcome {
    /// Still open; the orchestrator closes them.
    pub sinks: Sinks,
    pub stats: ReportStats,
    /// A report halted the run.
    pub fatal: bool,
}

/// Consumes [`Report`]s from every worker and writes them out.
///
/// With `continue_on_error = false` the first failed result or error is
/// fatal: the reporter writes it, cancels `shutdown`, writes whatever reports
/// were already queued, and stops. Input-stream errors are fatal regardless.
#[derive(Debug)]
pub struct Reporter {
    sinks: Sinks,
    renderer: TextRenderer,
    continue_on_error: bool,
    shutdown: CancellationToken,
    stats: ReportStats,
    fatal: bool,
}

impl Reporter {
    pub fn new(
        sinks: Sinks,
        renderer: TextRenderer,
        continue_on_error: bool,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sinks,
            renderer,
            continue_on_error,
            shutdown,
            stats: ReportStats::default(),
            fatal: false,
        }
    }

    /// Main loop. Ends when every sender is dropped, or on shutdown.
    pub async fn run(mut self, mut reports: mpsc::Receiver<Report>) -> ReporterOutcome {
        debug!("reporter started");

        loop {
            let report = tokio::select! {
                biased;
                report = reports.recv() => match report {
                    Some(r) => r,
                    None => {
                        debug!("report channel closed; reporter finishing");
                        break;
                    }
                },
                _ = self.shutdown.cancelled() => {
                    debug!("shutdown requested; reporter flushing queued reports");
                    self.flush_queued(&mut reports).await;
                    break;
                }
            };

            if self.handle(report).await {
                self.halt();
                self.flush_queued(&mut reports).await;
                break;
            }
        }

        ReporterOutcome {
            sinks: self.sinks,
            stats: self.stats,
            fatal: self.fatal,
        }
    }

    /// Write one report. Returns `true` if it halts the run.
    async fn handle(&mut self, report: Report) -> bool {
        match report {
            Report::Result(result) if result.succeeded => {
                self.stats.succeeded += 1;
                let text = self.renderer.render_result(&result);
                write(&mut self.sinks.text_out, &text, &mut self.stats).await;
                let line = structured_result(&result);
                write(&mut self.sinks.structured_out, &line, &mut self.stats).await;
                false
            }
            Report::Result(result) => {
                self.stats.failed += 1;
                let text = self.renderer.render_result(&result);
                write(&mut self.sinks.text_err, &text, &mut self.stats).await;
                let line = structured_result(&result);
                write(&mut self.sinks.structured_err, &line, &mut self.stats).await;
                !self.continue_on_error
            }
            Report::Error(err) => {
                self.stats.errors += 1;
                let text = self.renderer.render_error(&err);
                write(&mut self.sinks.text_err, &text, &mut self.stats).await;
                let line = structured_error(&err);
                write(&mut self.sinks.structured_err, &line, &mut self.stats).await;
                !self.continue_on_error || err.is_always_fatal()
            }
        }
    }

    fn halt(&mut self) {
        if !self.fatal {
            error!("fatal error reported; shutting down pipeline");
        }
        self.fatal = true;
        self.shutdown.cancel();
    }

    /// Stop accepting reports and write the ones already queued.
    async fn flush_queued(&mut self, reports: &mut mpsc::Receiver<Report>) {
        reports.close();
        let mut flushed = 0usize;
        while let Ok(report) = reports.try_recv() {
            flushed += 1;
            if self.handle(report).await {
                self.fatal = true;
            }
        }
        if flushed > 0 {
            info!(flushed, "wrote reports queued before shutdown");
        }
    }
}

async fn write(sink: &mut Sink, text: &str, stats: &mut ReportStats) {
    if !sink.is_active() {
        return;
    }
    if let Err(err) = sink.write_line(text).await {
        stats.sink_errors += 1;
        warn!(sink = %sink.name(), error = %err, "failed to write report; sink disabled");
    }
}

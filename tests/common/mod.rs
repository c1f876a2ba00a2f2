#![allow(dead_code)]

use std::sync::Arc;

use tokio::io::AsyncRead;

use streamexec::config::ExecutionOptions;
use streamexec::exec::ProcessBackend;
use streamexec::pipeline::{Orchestrator, RunSummary};
use streamexec::report::TextRenderer;
use streamexec_test_utils::io::MemorySinks;
use streamexec_test_utils::with_timeout;

pub use streamexec_test_utils::init_tracing;

/// Run a whole pipeline over `input` against in-memory sinks.
pub async fn run_pipeline<B, R>(
    options: Arc<ExecutionOptions>,
    backend: B,
    input: R,
) -> (RunSummary, MemorySinks)
where
    B: ProcessBackend + 'static,
    R: AsyncRead + Unpin + Send + 'static,
{
    let sinks = MemorySinks::new();
    let renderer = TextRenderer::plain(options.debug);
    let orchestrator =
        Orchestrator::new(options, backend, input, sinks.sinks()).with_renderer(renderer);

    let summary = with_timeout(orchestrator.run())
        .await
        .expect("pipeline should not return an error");
    (summary, sinks)
}

/// Parse every line of a structured sink as JSON.
pub fn json_lines(lines: &[String]) -> Vec<serde_json::Value> {
    lines
        .iter()
        .map(|l| serde_json::from_str(l).expect("structured sink line is JSON"))
        .collect()
}

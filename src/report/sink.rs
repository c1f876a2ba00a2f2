// src/report/sink.rs

//! Output targets for the reporter.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::SinkPaths;
use crate::errors::{Result, StreamExecError};

pub type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A named, line-oriented output target.
///
/// A sink without a writer is disabled: writes are silently skipped. After a
/// failed write or a `close` the writer is dropped, so the sink is never
/// written again and closing twice is a no-op.
pub struct Sink {
    name: String,
    writer: Option<BoxWriter>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Sink {
    pub fn new(name: impl Into<String>, writer: BoxWriter) -> Self {
        Self {
            name: name.into(),
            writer: Some(writer),
        }
    }

    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            writer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Write `text`, adding a trailing newline if missing, and flush.
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let res = async {
            writer.write_all(text.as_bytes()).await?;
            if !text.ends_with('\n') {
                writer.write_all(b"\n").await?;
            }
            writer.flush().await
        }
        .await;

        res.map_err(|source| {
            self.writer = None;
            StreamExecError::Sink {
                sink: self.name.clone(),
                source,
            }
        })
    }

    /// Flush and shut the writer down. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        debug!(sink = %self.name, "closing sink");

        let res = async {
            writer.flush().await?;
            writer.shutdown().await
        }
        .await;

        res.map_err(|source| StreamExecError::Sink {
            sink: self.name.clone(),
            source,
        })
    }
}

/// The four sinks a run writes to.
#[derive(Debug)]
pub struct Sinks {
    /// Human-readable successes.
    pub text_out: Sink,
    /// Human-readable failures and errors.
    pub text_err: Sink,
    /// JSON lines for successes.
    pub structured_out: Sink,
    /// JSON lines for failures and errors.
    pub structured_err: Sink,
}

impl Sinks {
    /// Production sinks: stdout, stderr, and append-mode files for whichever
    /// structured paths are configured.
    pub async fn open(paths: &SinkPaths) -> AnyResult<Self> {
        Ok(Self {
            text_out: Sink::new("stdout", Box::new(tokio::io::stdout())),
            text_err: Sink::new("stderr", Box::new(tokio::io::stderr())),
            structured_out: open_optional("output log", paths.output_log.as_deref()).await?,
            structured_err: open_optional("error log", paths.error_log.as_deref()).await?,
        })
    }

    /// Close every sink once, logging (not propagating) failures.
    ///
    /// Returns the number of sinks that failed to close.
    pub async fn close_all(&mut self) -> usize {
        let mut failures = 0;
        for sink in [
            &mut self.structured_err,
            &mut self.structured_out,
            &mut self.text_err,
            &mut self.text_out,
        ] {
            if let Err(err) = sink.close().await {
                warn!(error = %err, "failed to close sink");
                failures += 1;
            }
        }
        failures
    }
}

async fn open_optional(name: &str, path: Option<&Path>) -> AnyResult<Sink> {
    let Some(path) = path else {
        return Ok(Sink::disabled(name));
    };
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("opening {name} file {}", path.display()))?;
    Ok(Sink::new(format!("{name} ({})", path.display()), Box::new(file)))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};

    use super::*;

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_writes_disable_the_sink() {
        let mut sink = Sink::new("broken", Box::new(BrokenPipe));
        let err = sink.write_line("hello").await.unwrap_err();
        assert!(matches!(err, StreamExecError::Sink { ref sink, .. } if sink == "broken"));
        assert!(!sink.is_active());
        sink.write_line("again").await.unwrap();
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut sink = Sink::new("sink", Box::new(tokio::io::sink()));
        sink.close().await.unwrap();
        sink.close().await.unwrap();
        assert!(!sink.is_active());
    }

    #[tokio::test]
    async fn structured_paths_are_opened_in_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(&path, "existing\n").unwrap();

        let paths = SinkPaths {
            output_log: Some(path.clone()),
            error_log: None,
        };
        let mut sinks = Sinks::open(&paths).await.unwrap();
        assert!(sinks.structured_out.is_active());
        assert!(!sinks.structured_err.is_active());

        sinks.structured_out.write_line("{\"Succeeded\":true}").await.unwrap();
        sinks.structured_out.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing\n{\"Succeeded\":true}\n");
    }
}

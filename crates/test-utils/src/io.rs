use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use streamexec::report::{Sink, Sinks};

/// In-memory writer whose contents stay readable after it is boxed into a
/// [`Sink`].
#[derive(Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
    shutdowns: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self, name: &str) -> Sink {
        Sink::new(name, Box::new(self.clone()))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// How many times the writer was shut down.
    pub fn shutdowns(&self) -> usize {
        *self.shutdowns.lock().unwrap()
    }
}

impl AsyncWrite for MemorySink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        *self.shutdowns.lock().unwrap() += 1;
        Poll::Ready(Ok(()))
    }
}

/// One [`MemorySink`] per pipeline sink.
#[derive(Clone, Default)]
pub struct MemorySinks {
    pub text_out: MemorySink,
    pub text_err: MemorySink,
    pub structured_out: MemorySink,
    pub structured_err: MemorySink,
}

impl MemorySinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sinks(&self) -> Sinks {
        Sinks {
            text_out: self.text_out.sink("text out"),
            text_err: self.text_err.sink("text err"),
            structured_out: self.structured_out.sink("structured out"),
            structured_err: self.structured_err.sink("structured err"),
        }
    }
}

/// Yields `data`, then fails every later read with `kind`.
pub struct FailingReader {
    data: Vec<u8>,
    pos: usize,
    kind: io::ErrorKind,
}

impl FailingReader {
    pub fn new(data: &[u8], kind: io::ErrorKind) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            kind,
        }
    }
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.pos >= self.data.len() {
            return Poll::Ready(Err(io::Error::from(self.kind)));
        }
        let n = buf.remaining().min(self.data.len() - self.pos);
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

/// Yields `data` in chunks of at most `chunk` bytes.
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk: chunk.max(1),
        }
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let n = self
            .chunk
            .min(buf.remaining())
            .min(self.data.len() - self.pos);
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

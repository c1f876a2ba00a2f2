// src/input/reader.rs

//! Reader task: input stream → record queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::{Result, StreamExecError};
use crate::input::reassembler::LineReassembler;
use crate::pipeline::queue::RecordSender;
use crate::types::Record;

/// Upper bound on a single read from the input stream.
pub const READ_CHUNK_SIZE: usize = 5000;

/// Read `input` to end-of-stream, pushing every non-blank record onto `queue`.
///
/// `enqueued` is incremented per record handed to the queue, so the count
/// stays meaningful even if this task is aborted. The queue is closed when
/// this function returns (the sender is dropped).
///
/// Returns early, without error, once `shutdown` fires. Any read error is an
/// [`StreamExecError::InputStream`].
pub async fn read_records<R>(
    mut input: R,
    queue: RecordSender,
    shutdown: CancellationToken,
    enqueued: Arc<AtomicUsize>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut reassembler = LineReassembler::new();

    info!("input reader started");

    loop {
        let read = tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("shutdown requested; input reader stopping");
                return Ok(());
            }
            read = input.read(&mut buf) => read,
        };

        let n = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamExecError::InputStream(e)),
        };

        for record in reassembler.push(&buf[..n]) {
            if !enqueue(&queue, record, &shutdown, &enqueued).await {
                return Ok(());
            }
        }
    }

    if let Some(record) = reassembler.finish() {
        enqueue(&queue, record, &shutdown, &enqueued).await;
    }

    info!(
        records = enqueued.load(Ordering::SeqCst),
        "input reader reached end of stream"
    );
    Ok(())
}

/// Push one record, waiting for queue space. Returns `false` if the pipeline
/// is shutting down and the reader should stop.
async fn enqueue(
    queue: &RecordSender,
    record: Record,
    shutdown: &CancellationToken,
    enqueued: &AtomicUsize,
) -> bool {
    // Blank lines never become records, so they are neither run nor reported.
    if record.is_empty() {
        debug!("skipping blank input line");
        return true;
    }

    tokio::select! {
        _ = shutdown.cancelled() => false,
        sent = queue.send(record) => match sent {
            Ok(()) => {
                enqueued.fetch_add(1, Ordering::SeqCst);
                true
            }
            Err(_) => {
                debug!("record queue closed; input reader stopping");
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::queue::record_queue;

    #[tokio::test]
    async fn reads_all_records_and_closes_the_queue() {
        let input: &[u8] = b"{\"a\":1}\n\n{\"a\":2}\n{\"a\":3}";
        let (tx, rx) = record_queue(8);
        let count = Arc::new(AtomicUsize::new(0));

        read_records(input, tx, CancellationToken::new(), count.clone())
            .await
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 3);
        let mut seen = Vec::new();
        while let Some(record) = rx.recv().await {
            seen.push(record);
        }
        assert_eq!(seen, vec![r#"{"a":1}"#, r#"{"a":2}"#, r#"{"a":3}"#]);
    }

    #[tokio::test]
    async fn stops_when_cancelled_while_queue_is_full() {
        let input: &[u8] = b"1\n2\n3\n";
        let (tx, _rx) = record_queue(1);
        let shutdown = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn(read_records(input, tx, shutdown.clone(), count.clone()));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        shutdown.cancel();

        handle.await.unwrap().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

// src/pipeline/queue.rs

//! Bounded record queue with one producer and many consumers.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::types::Record;

/// Create a queue holding at most `capacity` records.
///
/// The queue closes once the [`RecordSender`] is dropped; receivers then see
/// the remaining records followed by `None`.
pub fn record_queue(capacity: usize) -> (RecordSender, RecordReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        RecordSender { tx },
        RecordReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer half, owned by the input reader.
#[derive(Debug)]
pub struct RecordSender {
    tx: mpsc::Sender<Record>,
}

impl RecordSender {
    /// Wait for space and enqueue. Fails (returning the record) only if every
    /// receiver is gone.
    pub async fn send(&self, record: Record) -> Result<(), Record> {
        self.tx.send(record).await.map_err(|e| e.0)
    }
}

/// Consumer half. Clones share one underlying receiver, so every record is
/// delivered to exactly one of them.
#[derive(Debug, Clone)]
pub struct RecordReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Record>>>,
}

impl RecordReceiver {
    /// Wait for the next record; `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<Record> {
        self.rx.lock().await.recv().await
    }

    /// Take a record that is already buffered, without waiting for more.
    pub async fn try_next(&self) -> Option<Record> {
        self.rx.lock().await.try_recv().ok()
    }

    /// Records currently buffered.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.rx.lock().await.len()
    }
}

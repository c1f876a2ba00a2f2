use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use proptest::prelude::*;
use streamexec::input::{read_records, LineReassembler};
use streamexec::pipeline::record_queue;
use streamexec_test_utils::io::ChunkedReader;
use tokio_util::sync::CancellationToken;

// Lines built from a small alphabet so newlines, padding, CR and multi-byte
// characters all show up often.
fn input_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("\n"),
            Just(" "),
            Just("\r"),
            Just("{\"a\": 1}"),
            Just("ß"),
            Just("日本"),
            Just("x"),
        ],
        0..60,
    )
    .prop_map(|parts| parts.concat())
}

// Chunk sizes to cut the input with, applied cyclically.
fn cuts_strategy() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(1..12usize, 1..8)
}

/// Records the whole input would yield in one piece.
fn expected(input: &str) -> Vec<String> {
    let mut pieces: Vec<String> = input.split('\n').map(|l| l.trim().to_string()).collect();
    if input.ends_with('\n') || input.is_empty() {
        pieces.pop();
    }
    pieces
}

fn reassemble(bytes: &[u8], cuts: &[usize]) -> Vec<String> {
    let mut r = LineReassembler::new();
    let mut out = Vec::new();
    let mut pos = 0;
    for size in cuts.iter().cycle() {
        if pos >= bytes.len() {
            break;
        }
        let end = (pos + size).min(bytes.len());
        out.extend(r.push(&bytes[pos..end]));
        pos = end;
    }
    out.extend(r.finish());
    out
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_records(
        input in input_strategy(),
        cuts in cuts_strategy(),
    ) {
        prop_assert_eq!(reassemble(input.as_bytes(), &cuts), expected(&input));
    }

    #[test]
    fn reader_enqueues_every_non_blank_record(
        input in input_strategy(),
        chunk in 1..16usize,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let got = rt.block_on(async {
            let (tx, rx) = record_queue(1024);
            let enqueued = Arc::new(AtomicUsize::new(0));
            read_records(
                ChunkedReader::new(input.clone(), chunk),
                tx,
                CancellationToken::new(),
                enqueued,
            )
            .await
            .unwrap();

            let mut got = Vec::new();
            while let Some(record) = rx.recv().await {
                got.push(record);
            }
            got
        });

        let want: Vec<String> = expected(&input)
            .into_iter()
            .filter(|r| !r.is_empty())
            .collect();
        prop_assert_eq!(got, want);
    }
}

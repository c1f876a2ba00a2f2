// src/input/reassembler.rs

//! Chunk → record reassembly.

use crate::types::Record;

/// Splits a chunked byte stream into newline-terminated records.
///
/// Bytes after the last newline of a chunk are kept as a remainder and
/// prefixed to the next chunk, so the emitted records do not depend on where
/// the chunk boundaries fall. Splitting happens on raw bytes: a `\n` byte is
/// never part of a multi-byte UTF-8 sequence, so a character split across two
/// chunks is rejoined before decoding.
#[derive(Debug, Default)]
pub struct LineReassembler {
    remainder: Vec<u8>,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every record it completes, in order.
    ///
    /// Records are trimmed of surrounding whitespace (including the `\r` of
    /// CRLF line endings). Blank lines come back as empty records.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Record> {
        let Some(last_newline) = chunk.iter().rposition(|b| *b == b'\n') else {
            self.remainder.extend_from_slice(chunk);
            return Vec::new();
        };

        let mut block = std::mem::take(&mut self.remainder);
        block.extend_from_slice(&chunk[..last_newline]);
        self.remainder.extend_from_slice(&chunk[last_newline + 1..]);

        block.split(|b| *b == b'\n').map(clean_line).collect()
    }

    /// Bytes waiting for a newline.
    #[cfg(test)]
    fn pending(&self) -> usize {
        self.remainder.len()
    }

    /// End of stream: emit the unterminated tail, if there is one.
    pub fn finish(self) -> Option<Record> {
        if self.remainder.is_empty() {
            None
        } else {
            Some(clean_line(&self.remainder))
        }
    }
}

fn clean_line(bytes: &[u8]) -> Record {
    String::from_utf8_lossy(bytes).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[&[u8]]) -> Vec<Record> {
        let mut r = LineReassembler::new();
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(r.push(chunk));
        }
        out.extend(r.finish());
        out
    }

    #[test]
    fn partial_lines_are_held_until_the_newline_arrives() {
        let mut r = LineReassembler::new();
        assert!(r.push(b"{\"a\":").is_empty());
        assert_eq!(r.pending(), 5);
        assert_eq!(r.push(b" 1}\n{\"b\""), vec![r#"{"a": 1}"#]);
        assert_eq!(r.push(b": 2}\n"), vec![r#"{"b": 2}"#]);
        assert_eq!(r.pending(), 0);
        assert_eq!(r.finish(), None);
    }

    #[test]
    fn unterminated_tail_is_emitted_at_end_of_stream() {
        let out = reassemble(&[b"{\"a\":1}\n  {\"b\":2}  "]);
        assert_eq!(out, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn crlf_and_surrounding_whitespace_are_trimmed() {
        let out = reassemble(&[b"  {\"a\":1}\r\n\t{\"b\":2}\r\n"]);
        assert_eq!(out, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn blank_lines_come_through_as_empty_records() {
        let out = reassemble(&[b"x\n\n", b"y\n"]);
        assert_eq!(out, vec!["x", "", "y"]);
    }

    #[test]
    fn multibyte_characters_split_across_chunks_survive() {
        let text = "{\"k\":\"straße\"}\n".as_bytes();
        let split = text.iter().position(|b| *b == 0xc3).unwrap() + 1;
        let out = reassemble(&[&text[..split], &text[split..]]);
        assert_eq!(out, vec!["{\"k\":\"straße\"}"]);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(reassemble(&[]).is_empty());
        assert!(reassemble(&[b""]).is_empty());
    }
}

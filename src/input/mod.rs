// src/input/mod.rs

//! Input side of the pipeline.
//!
//! - [`reassembler`] turns arbitrary byte chunks into whole, trimmed records.
//! - [`reader`] drives the reassembler from an `AsyncRead` and feeds the
//!   record queue until end-of-stream.

pub mod reader;
pub mod reassembler;

pub use reader::{read_records, READ_CHUNK_SIZE};
pub use reassembler::LineReassembler;

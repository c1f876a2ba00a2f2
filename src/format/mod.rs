// src/format/mod.rs

//! Record → environment formatting.
//!
//! A record is one line of JSON text. [`env::format_env`] turns its top-level
//! fields into `KEY=VALUE` assignments that become the whole environment of
//! the command run for that record.

pub mod env;

pub use env::{format_env, sanitize_key, FormatError};
